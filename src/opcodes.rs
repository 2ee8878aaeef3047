//! Opcode mnemonic recognition and mode-flag encoding.
//!
//! An identifier is either an opcode or it isn't — there is no partial
//! match. The base mnemonic fixes bits 0-4 (or all of them, for `BRK`
//! and the three immediate-jump mnemonics), and up to three one-letter
//! suffixes set [`ModeFlags`] on top of it.

use bitflags::bitflags;

bitflags! {
    /// Mode flags layered on top of a base opcode byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u8 {
        /// `2` suffix — operate on a 16-bit value instead of 8-bit.
        const SHORT = 0b0010_0000;
        /// `r` suffix — operate on the return stack instead of the working stack.
        const RETURN = 0b0100_0000;
        /// `k` suffix — keep the operands instead of consuming them.
        const KEEP = 0b1000_0000;
    }
}

/// The 32 base mnemonics, in their fixed encoding order (`BRK` = 0x00,
/// `SFT` = 0x1f). Represented as a closed table rather than a hash map:
/// the match is a three-character prefix test against a fixed list, not
/// an open-ended lookup.
const BASE_MNEMONICS: [&str; 32] = [
    "BRK", "INC", "POP", "NIP", "SWP", "ROT", "DUP", "OVR", "EQU", "NEQ", "GTH", "LTH", "JMP",
    "JCN", "JSR", "STH", "LDZ", "STZ", "LDR", "STR", "LDA", "STA", "DEI", "DEO", "ADD", "SUB",
    "MUL", "DIV", "AND", "ORA", "EOR", "SFT",
];

/// The three immediate mnemonics, which do not take mode-flag suffixes
/// of their own beyond what their base byte already encodes.
const IMMEDIATE_MNEMONICS: [(&str, u8); 3] = [("JCI", 0x20), ("JMI", 0x40), ("JSI", 0x60)];

/// Encode an identifier as an opcode byte, or return `None` if it does
/// not match any recognized mnemonic.
pub fn encode(identifier: &str) -> Option<u8> {
    if identifier == "BRK" {
        return Some(0x00);
    }

    for (mnemonic, base) in IMMEDIATE_MNEMONICS {
        if identifier == mnemonic {
            return Some(base);
        }
    }

    let bytes = identifier.as_bytes();
    if bytes.len() < 3 {
        return None;
    }
    let prefix = &identifier[..3];

    let base = BASE_MNEMONICS.iter().position(|&m| m == prefix)? as u8;
    // A "BRK"-prefixed identifier longer than "BRK" itself reinterprets
    // as LIT with KEEP set — this is how `0x80` (LIT) disassembles.
    let mut flags = if base == 0x00 {
        ModeFlags::KEEP
    } else {
        ModeFlags::empty()
    };

    for suffix in bytes[3..].iter() {
        match suffix {
            b'2' => flags |= ModeFlags::SHORT,
            b'k' => flags |= ModeFlags::KEEP,
            b'r' => flags |= ModeFlags::RETURN,
            _ => return None,
        }
    }

    Some(base | flags.bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brk_alone() {
        assert_eq!(encode("BRK"), Some(0x00));
    }

    #[test]
    fn test_brk_with_keep_is_lit() {
        assert_eq!(encode("BRKk"), Some(0x80));
    }

    #[test]
    fn test_base_mnemonic_no_flags() {
        assert_eq!(encode("ADD"), Some(0x18));
    }

    #[test]
    fn test_all_flags_composed() {
        // ADD2kr: 0x18 | SHORT(0x20) | KEEP(0x80) | RETURN(0x40) = 0xF8
        assert_eq!(encode("ADD2kr"), Some(0xF8));
    }

    #[test]
    fn test_immediate_mnemonics() {
        assert_eq!(encode("JCI"), Some(0x20));
        assert_eq!(encode("JMI"), Some(0x40));
        assert_eq!(encode("JSI"), Some(0x60));
    }

    #[test]
    fn test_unknown_suffix_is_no_match() {
        assert_eq!(encode("ADDz"), None);
    }

    #[test]
    fn test_unknown_mnemonic_is_no_match() {
        assert_eq!(encode("XYZ"), None);
    }

    #[test]
    fn test_short_identifier_is_no_match() {
        assert_eq!(encode("AD"), None);
    }

    #[test]
    fn test_lit_opcode_byte() {
        // LIT itself is spelled BRKk at the source level; the literal
        // rune `#` emits 0x80 directly rather than going through encode().
        assert_eq!(encode("INC2"), Some(0x21));
    }
}
