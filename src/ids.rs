//! GUID generation for the project and its folder groups.
//!
//! GUIDs are written uppercase in braces, the way Visual Studio writes them:
//! `{4FC737F1-C7A5-4376-A066-2A32D752A2FF}`.

use uuid::Uuid;

/// Supplies fresh identities.  The converter asks for one GUID for the
/// project and one per custom folder group, in that order.
pub trait GuidSource {
    fn next_guid(&mut self) -> Uuid;
}

/// Random v4 GUIDs; what the command-line tool uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuids;

impl GuidSource for RandomGuids {
    fn next_guid(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic GUIDs counting up from 1, for reproducible output.
#[derive(Debug, Clone, Default)]
pub struct SequentialGuids {
    counter: u128,
}

impl SequentialGuids {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuidSource for SequentialGuids {
    fn next_guid(&mut self) -> Uuid {
        self.counter += 1;
        Uuid::from_u128(self.counter)
    }
}

/// `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`
pub fn braced(id: &Uuid) -> String {
    let mut buf = Uuid::encode_buffer();
    let text = id.braced().encode_upper(&mut buf);
    text.to_string()
}
