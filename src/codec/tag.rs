//! Type tag byte constants.

// Built-in shapes. These values are part of the wire format.
pub const INT: u8 = 0;
pub const FLOAT: u8 = 1;
pub const BYTES: u8 = 2;
pub const STR: u8 = 3;
pub const TUPLE: u8 = 4;
pub const LIST: u8 = 5;
pub const SET: u8 = 6;
pub const DICT: u8 = 7;
pub const BOOL: u8 = 8;
pub const COMPLEX: u8 = 10;
pub const TYPE: u8 = 11;
pub const NONE: u8 = 13;

// Generic reconstruction fallback.
pub const OBJ: u8 = 255;

// Extension slots below 16 with a conventional meaning. Any other free byte
// in 16..=254 may be claimed by a registered extension.
pub const FUNC: u8 = 9;
pub const CODE: u8 = 12;
pub const MAPPROXY: u8 = 14;
pub const MEMVIEW: u8 = 15;

/// Tags handled by the codec itself; extensions may not claim them.
pub const BUILTIN: [u8; 13] = [
    INT, FLOAT, BYTES, STR, TUPLE, LIST, SET, DICT, BOOL, COMPLEX, TYPE, NONE, OBJ,
];

pub fn is_builtin(tag: u8) -> bool {
    BUILTIN.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tags_are_distinct() {
        let mut seen = BUILTIN.to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), BUILTIN.len());
    }

    #[test]
    fn extension_slots_are_not_builtin() {
        for t in [FUNC, CODE, MAPPROXY, MEMVIEW, 16, 200, 254] {
            assert!(!is_builtin(t), "tag {t}");
        }
        assert!(is_builtin(OBJ));
    }
}
