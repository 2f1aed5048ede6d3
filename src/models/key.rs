//! Decoded keyboard events.

/// Modifier decoded from an xterm `CSI 1;<m>` arrow sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    Shift,
    Ctrl,
    ShiftCtrl,
}

impl Modifier {
    /// Height step an arrow key applies with this modifier held.
    pub fn step(&self) -> i32 {
        match self {
            Modifier::None => 1,
            Modifier::Shift => 20,
            Modifier::Ctrl | Modifier::ShiftCtrl => 200,
        }
    }
}

/// One decoded input action.
///
/// Only up/down arrows carry a modifier; left/right are recognised without
/// one and have no command bound to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Up(Modifier),
    Down(Modifier),
    Left,
    Right,
    Backspace,
    Enter,
}

impl Key {
    /// Map a CSI parameter/final byte string (the bytes after `ESC [`) to a key.
    ///
    /// Returns `None` for anything outside the supported table.
    pub fn from_csi(sequence: &[u8]) -> Option<Self> {
        let key = match sequence {
            b"A" => Key::Up(Modifier::None),
            b"B" => Key::Down(Modifier::None),
            b"C" => Key::Right,
            b"D" => Key::Left,
            b"1;2A" => Key::Up(Modifier::Shift),
            b"1;2B" => Key::Down(Modifier::Shift),
            b"1;5A" => Key::Up(Modifier::Ctrl),
            b"1;5B" => Key::Down(Modifier::Ctrl),
            b"1;6A" => Key::Up(Modifier::ShiftCtrl),
            b"1;6B" => Key::Down(Modifier::ShiftCtrl),
            _ => return None,
        };
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_steps() {
        assert_eq!(Modifier::None.step(), 1);
        assert_eq!(Modifier::Shift.step(), 20);
        assert_eq!(Modifier::Ctrl.step(), 200);
        assert_eq!(Modifier::ShiftCtrl.step(), 200);
    }

    #[test]
    fn test_from_csi_plain_arrows() {
        assert_eq!(Key::from_csi(b"A"), Some(Key::Up(Modifier::None)));
        assert_eq!(Key::from_csi(b"B"), Some(Key::Down(Modifier::None)));
        assert_eq!(Key::from_csi(b"C"), Some(Key::Right));
        assert_eq!(Key::from_csi(b"D"), Some(Key::Left));
    }

    #[test]
    fn test_from_csi_modified_arrows() {
        assert_eq!(Key::from_csi(b"1;2A"), Some(Key::Up(Modifier::Shift)));
        assert_eq!(Key::from_csi(b"1;2B"), Some(Key::Down(Modifier::Shift)));
        assert_eq!(Key::from_csi(b"1;5A"), Some(Key::Up(Modifier::Ctrl)));
        assert_eq!(Key::from_csi(b"1;5B"), Some(Key::Down(Modifier::Ctrl)));
        assert_eq!(Key::from_csi(b"1;6A"), Some(Key::Up(Modifier::ShiftCtrl)));
        assert_eq!(Key::from_csi(b"1;6B"), Some(Key::Down(Modifier::ShiftCtrl)));
    }

    #[test]
    fn test_from_csi_unsupported() {
        assert_eq!(Key::from_csi(b"1;3A"), None);
        assert_eq!(Key::from_csi(b"1;2C"), None);
        assert_eq!(Key::from_csi(b"H"), None);
        assert_eq!(Key::from_csi(b"5~"), None);
        assert_eq!(Key::from_csi(b""), None);
    }
}
