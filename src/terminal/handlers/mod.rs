//! Handler registry
//!
//! Every control byte, CSI, ESC, OSC and DCS action is looked up by key in
//! an ordered list of handlers. Dispatch tries the most recently registered
//! handler first and falls through to older ones when a handler declines
//! (returns `false`), so hosts can override or extend the defaults without
//! removing them.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use log::trace;

use super::emulator::Emulator;

mod control;
mod csi;
mod dcs;
mod esc;
mod osc;
mod sgr;

pub use sgr::apply_sgr;

/// Something that can act on one kind of action
pub trait Handler<A: ?Sized>: Send + Sync {
    /// Returns `false` to decline and let an older handler try
    fn handle(&self, emu: &mut Emulator, action: &A) -> bool;
}

impl<A: ?Sized, F> Handler<A> for F
where
    F: Fn(&mut Emulator, &A) -> bool + Send + Sync,
{
    fn handle(&self, emu: &mut Emulator, action: &A) -> bool {
        self(emu, action)
    }
}

// ========== Actions ==========

/// Key for CSI and DCS handlers. Zero means "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CsiKey {
    /// Private marker (`?`, `>`, `<`, `=`)
    pub marker: u8,
    /// Intermediate byte (0x20..=0x2f)
    pub intermediate: u8,
    pub final_byte: u8,
}

impl CsiKey {
    pub const fn new(marker: u8, intermediate: u8, final_byte: u8) -> Self {
        Self {
            marker,
            intermediate,
            final_byte,
        }
    }

    /// No marker, no intermediate
    pub const fn plain(final_byte: u8) -> Self {
        Self::new(0, 0, final_byte)
    }

    pub const fn private(marker: u8, final_byte: u8) -> Self {
        Self::new(marker, 0, final_byte)
    }

    pub const fn intermediate(intermediate: u8, final_byte: u8) -> Self {
        Self::new(0, intermediate, final_byte)
    }
}

/// Parameter list shared by CSI and DCS. Each parameter holds its
/// colon-separated sub-parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(pub Vec<Vec<u16>>);

impl Params {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value of parameter `idx`, if present
    pub fn raw(&self, idx: usize) -> Option<u16> {
        self.0.get(idx).and_then(|p| p.first().copied())
    }

    /// Parameter `idx`, with zero or missing replaced by `default`
    pub fn get(&self, idx: usize, default: u16) -> u16 {
        match self.raw(idx) {
            None | Some(0) => default,
            Some(v) => v,
        }
    }

    /// Sub-parameters of parameter `idx`
    pub fn sub(&self, idx: usize) -> &[u16] {
        self.0.get(idx).map(|p| p.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u16]> {
        self.0.iter().map(|p| p.as_slice())
    }
}

/// CSI action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csi {
    pub key: CsiKey,
    pub params: Params,
    /// The tokenizer dropped parameters beyond its limit
    pub truncated: bool,
}

/// ESC action (also used as its own key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Esc {
    pub intermediate: u8,
    pub final_byte: u8,
}

impl Esc {
    pub const fn new(intermediate: u8, final_byte: u8) -> Self {
        Self {
            intermediate,
            final_byte,
        }
    }

    pub const fn plain(final_byte: u8) -> Self {
        Self::new(0, final_byte)
    }
}

/// OSC action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Osc {
    /// Numeric command before the first `;`
    pub command: u32,
    /// Everything after the first `;` (`None` when there is no `;`)
    pub payload: Option<String>,
    /// Whole string as received
    pub raw: String,
    pub bell_terminated: bool,
}

impl Osc {
    /// Split raw OSC data into command number and payload. `None` when the
    /// command is not numeric.
    pub fn parse(raw: &str, bell_terminated: bool) -> Option<Osc> {
        let (cmd, payload) = match raw.split_once(';') {
            Some((cmd, rest)) => (cmd, Some(rest.to_string())),
            None => (raw, None),
        };
        let command = cmd.parse::<u32>().ok()?;
        Some(Osc {
            command,
            payload,
            raw: raw.to_string(),
            bell_terminated,
        })
    }
}

/// DCS action, dispatched once the string terminator arrives
#[derive(Clone, PartialEq, Eq)]
pub struct Dcs {
    pub key: CsiKey,
    pub params: Params,
    pub data: Vec<u8>,
}

impl fmt::Debug for Dcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dcs")
            .field("key", &self.key)
            .field("params", &self.params)
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}

// ========== Registry ==========

/// Ordered handler lists per key
pub struct Registry<K, A: ?Sized> {
    map: HashMap<K, Vec<Box<dyn Handler<A>>>>,
}

impl<K: Eq + Hash, A: ?Sized> Default for Registry<K, A> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, A: ?Sized> Registry<K, A> {
    /// Add a handler; it takes precedence over those already registered
    pub fn register<H>(&mut self, key: K, handler: H)
    where
        H: Handler<A> + 'static,
    {
        self.map.entry(key).or_default().push(Box::new(handler));
    }

    /// Try handlers newest first. `false` when none accepted.
    pub fn dispatch(&self, key: &K, emu: &mut Emulator, action: &A) -> bool {
        self.map
            .get(key)
            .map(|list| list.iter().rev().any(|h| h.handle(emu, action)))
            .unwrap_or(false)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }
}

/// All registries of a terminal
#[derive(Default)]
pub struct Handlers {
    pub control: Registry<u8, u8>,
    pub csi: Registry<CsiKey, Csi>,
    pub esc: Registry<Esc, Esc>,
    pub osc: Registry<u32, Osc>,
    pub dcs: Registry<CsiKey, Dcs>,
}

impl Handlers {
    /// Empty registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries populated with the built-in action set
    pub fn with_defaults() -> Self {
        let mut handlers = Self::new();
        control::register(&mut handlers.control);
        csi::register(&mut handlers.csi);
        esc::register(&mut handlers.esc);
        osc::register(&mut handlers.osc);
        dcs::register(&mut handlers.dcs);
        handlers
    }

    pub fn dispatch_control(&self, emu: &mut Emulator, byte: u8) {
        if !self.control.dispatch(&byte, emu, &byte) {
            trace!("Unhandled control character: 0x{:02x}", byte);
        }
    }

    pub fn dispatch_csi(&self, emu: &mut Emulator, csi: &Csi) {
        if !self.csi.dispatch(&csi.key, emu, csi) {
            trace!("Unhandled CSI: {:?}", csi);
        }
    }

    pub fn dispatch_esc(&self, emu: &mut Emulator, esc: &Esc) {
        if !self.esc.dispatch(esc, emu, esc) {
            trace!("Unhandled ESC: {:?}", esc);
        }
    }

    pub fn dispatch_osc(&self, emu: &mut Emulator, osc: &Osc) {
        if !self.osc.dispatch(&osc.command, emu, osc) {
            trace!("Unhandled OSC: {:?}", osc.raw);
        }
    }

    pub fn dispatch_dcs(&self, emu: &mut Emulator, dcs: &Dcs) {
        if !self.dcs.dispatch(&dcs.key, emu, dcs) {
            trace!("Unhandled DCS: {:?}", dcs);
        }
    }
}
