//! VT escape sequence parser glue
//!
//! Implements vte crate's Perform trait
//! and routes each action through the handler registry.

use log::{trace, warn};
use vte::{Params as VteParams, Perform};

use super::emulator::Emulator;
use super::handlers::{Csi, CsiKey, Dcs, Esc, Handlers, Osc, Params};

/// DCS string being collected between hook and unhook
#[derive(Debug)]
pub struct PendingDcs {
    key: CsiKey,
    params: Params,
    data: Vec<u8>,
    overflow: bool,
}

/// vte::Perform implementation
/// Borrows the emulator and the registry for the duration of one write
pub struct Performer<'a> {
    emu: &'a mut Emulator,
    handlers: &'a Handlers,
    dcs: &'a mut Option<PendingDcs>,
}

impl<'a> Performer<'a> {
    pub fn new(
        emu: &'a mut Emulator,
        handlers: &'a Handlers,
        dcs: &'a mut Option<PendingDcs>,
    ) -> Self {
        Self { emu, handlers, dcs }
    }
}

/// Split vte intermediates into (private marker, intermediate byte)
fn split_intermediates(intermediates: &[u8]) -> (u8, u8) {
    let mut marker = 0;
    let mut intermediate = 0;
    for &b in intermediates {
        match b {
            0x3c..=0x3f if marker == 0 => marker = b,
            0x20..=0x2f => intermediate = b,
            _ => {}
        }
    }
    (marker, intermediate)
}

fn convert_params(params: &VteParams) -> Params {
    Params(params.iter().map(|p| p.to_vec()).collect())
}

fn key_for(intermediates: &[u8], action: char) -> Option<CsiKey> {
    let final_byte = u8::try_from(action).ok()?;
    let (marker, intermediate) = split_intermediates(intermediates);
    Some(CsiKey::new(marker, intermediate, final_byte))
}

impl<'a> Perform for Performer<'a> {
    /// Printable character (C1 controls decoded from UTF-8 are executed)
    fn print(&mut self, c: char) {
        if ('\u{80}'..='\u{9f}').contains(&c) {
            self.handlers.dispatch_control(self.emu, c as u8);
            return;
        }
        self.emu.print(c);
    }

    /// C0/C1 control character
    fn execute(&mut self, byte: u8) {
        self.handlers.dispatch_control(self.emu, byte);
    }

    fn csi_dispatch(&mut self, params: &VteParams, intermediates: &[u8], ignore: bool, action: char) {
        let Some(key) = key_for(intermediates, action) else {
            trace!("Unhandled CSI final: {:?}", action);
            return;
        };
        let csi = Csi {
            key,
            params: convert_params(params),
            truncated: ignore,
        };
        self.handlers.dispatch_csi(self.emu, &csi);
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        if ignore {
            trace!("ESC with too many intermediates ignored");
            return;
        }
        let intermediate = intermediates.first().copied().unwrap_or(0);
        self.handlers
            .dispatch_esc(self.emu, &Esc::new(intermediate, byte));
    }

    /// DCS sequence start
    fn hook(&mut self, params: &VteParams, intermediates: &[u8], _ignore: bool, action: char) {
        let Some(key) = key_for(intermediates, action) else {
            *self.dcs = None;
            return;
        };
        trace!("DCS hook: {:?}", key);
        *self.dcs = Some(PendingDcs {
            key,
            params: convert_params(params),
            data: Vec::new(),
            overflow: false,
        });
    }

    /// Data within DCS sequence
    fn put(&mut self, byte: u8) {
        let limit = self.emu.options().max_dcs_payload;
        if let Some(pending) = self.dcs.as_mut() {
            if pending.overflow {
                return;
            }
            if pending.data.len() >= limit {
                warn!("DCS payload exceeds {} bytes, dropping", limit);
                pending.overflow = true;
                pending.data = Vec::new();
                return;
            }
            pending.data.push(byte);
        }
    }

    /// DCS sequence end
    fn unhook(&mut self) {
        let Some(pending) = self.dcs.take() else {
            return;
        };
        if pending.overflow {
            return;
        }
        let dcs = Dcs {
            key: pending.key,
            params: pending.params,
            data: pending.data,
        };
        self.handlers.dispatch_dcs(self.emu, &dcs);
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], bell_terminated: bool) {
        if params.is_empty() {
            return;
        }
        let raw = params
            .iter()
            .map(|p| String::from_utf8_lossy(p))
            .collect::<Vec<_>>()
            .join(";");
        match Osc::parse(&raw, bell_terminated) {
            Some(osc) => self.handlers.dispatch_osc(self.emu, &osc),
            None => trace!("Unhandled OSC: {:?}", raw),
        }
    }
}
