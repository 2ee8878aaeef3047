//! The two-pass assembly driver.
//!
//! Pass 1 walks the source once to fix every label's address and record
//! every macro body, without emitting a single byte. Pass 2 walks it
//! again from a fresh scanner, this time emitting code and resolving
//! every reference against the addresses pass 1 fixed. The two passes
//! share the same rune table — a `(`, `@`, `#`, and so on always mean
//! the same kind of thing — but differ in what they do when a rune
//! fires: pass 1 only ever moves the memory position, pass 2 only ever
//! emits bytes (and expands macros, which pass 1 does not do at all).

use crate::diagnostics::Diagnostics;
use crate::memory::MemPos;
use crate::opcodes;
use crate::scanner::{self, Cursor, Number, Scanner};
use crate::symbols::{LabelTable, MacroTable};

#[cfg(feature = "cli")]
macro_rules! asm_trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}
#[cfg(not(feature = "cli"))]
macro_rules! asm_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "cli")]
macro_rules! asm_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}
#[cfg(not(feature = "cli"))]
macro_rules! asm_debug {
    ($($arg:tt)*) => {};
}

/// Owns every piece of state threaded through both passes and runs them.
pub struct Program<'a> {
    source: &'a [u8],
    scanner: Scanner<'a>,
    labels: LabelTable,
    macros: MacroTable,
    diagnostics: Diagnostics,
    mem: MemPos,
    code: Vec<u8>,
    state_stack: Vec<Cursor>,
    macro_mode: bool,
}

impl<'a> Program<'a> {
    /// Create a driver over `source`, ready to run pass 1.
    pub fn new(source: &'a [u8]) -> Self {
        Program {
            source,
            scanner: Scanner::new(source),
            labels: LabelTable::new(),
            macros: MacroTable::new(),
            diagnostics: Diagnostics::new(),
            mem: MemPos::new(),
            code: Vec::new(),
            state_stack: Vec::new(),
            macro_mode: false,
        }
    }

    /// Run both passes and consume the driver into its results.
    pub fn run(mut self) -> (Vec<u8>, Diagnostics, usize, usize) {
        asm_debug!("pass 1 starting");
        self.run_pass1();
        asm_debug!(end_address = self.mem.get(), "pass 1 finished");

        self.scanner = Scanner::new(self.source);
        self.mem = MemPos::new();
        self.state_stack.clear();
        self.macro_mode = false;

        asm_debug!("pass 2 starting");
        self.run_pass2(false);
        asm_debug!(bytes = self.code.len(), "pass 2 finished");

        let label_count = self.labels.len();
        let macro_count = self.macros.len();
        (self.code, self.diagnostics, label_count, macro_count)
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let (line, col) = self.scanner.take_anchor();
        self.diagnostics.error(line, col, message);
    }

    fn warn_here(&mut self, message: impl Into<String>) {
        let (line, col) = self.scanner.take_anchor();
        self.diagnostics.warn(line, col, message);
    }

    // ---- pass 1 -------------------------------------------------------

    fn run_pass1(&mut self) {
        self.scanner.skip_whitespace();
        while !self.scanner.at_end(false) {
            self.scanner.set_start();
            self.pass1_token();
            self.scanner.skip_whitespace();
        }
    }

    fn pass1_token(&mut self) {
        let rune = self.scanner.peek();
        match rune {
            b'(' => {
                self.scanner.advance();
                if self.scanner.skip_comment().is_err() {
                    self.error_here("Missing closing parenthesis");
                }
            }
            b'[' | b'{' => {
                self.scanner.advance();
            }
            b']' | b'}' => {
                self.scanner.advance();
                self.error_here("Unexpected closing bracket");
            }
            b'"' => {
                self.scanner.advance();
                // Pass 1 deliberately does not budget memory for raw
                // strings; pass 2's byte-for-byte emission is what fixes
                // the addresses of anything that follows.
                self.scanner.scan_identifier();
            }
            b'%' => {
                self.scanner.advance();
                self.pass1_macro_def();
            }
            b'@' => {
                self.scanner.advance();
                self.pass1_label_decl(false);
            }
            b'&' => {
                self.scanner.advance();
                self.pass1_label_decl(true);
            }
            b'|' => {
                self.scanner.advance();
                self.apply_padding(true);
            }
            b'$' => {
                self.scanner.advance();
                self.apply_padding(false);
            }
            b'#' => {
                self.scanner.advance();
                self.pass1_literal();
            }
            b'.' => {
                self.scanner.advance();
                self.scanner.scan_identifier();
                self.mem.move_by(2, false);
            }
            b';' => {
                self.scanner.advance();
                self.scanner.scan_identifier();
                self.mem.move_by(3, false);
            }
            b'-' => {
                self.scanner.advance();
                self.scanner.scan_identifier();
                self.mem.move_by(1, false);
            }
            b'=' => {
                self.scanner.advance();
                self.scanner.scan_identifier();
                self.mem.move_by(2, false);
            }
            _ => self.pass1_word(),
        }
    }

    fn pass1_word(&mut self) {
        let Some(word) = self.scanner.scan_identifier() else {
            return;
        };
        if opcodes::encode(&word).is_some() {
            self.mem.advance_one();
        } else if let Some(result) = scanner::literal_number_from_str(&word) {
            match result {
                Ok(number) => self.mem.move_by(number.len() as u16, false),
                Err(message) => self.error_here(message),
            }
        }
        // Otherwise this is a macro invocation (or genuinely unresolvable
        // identifier); pass 1 does not expand macros, so it contributes
        // nothing to the memory position here.
    }

    fn pass1_macro_def(&mut self) {
        let Some(name) = self.scanner.scan_identifier() else {
            self.error_here("Expected macro name");
            return;
        };
        self.scanner.skip_whitespace();
        if self.scanner.peek() != b'{' {
            self.error_here("Expected '{' to open macro body");
            return;
        }
        self.scanner.advance();
        let body = self.scanner.save();
        if self.scanner.skip_until(b'}').is_err() {
            self.error_here("Unterminated macro body");
            return;
        }
        asm_trace!(macro_name = %name, "recorded macro");
        self.macros.add(&name, body);
    }

    fn pass1_label_decl(&mut self, is_sub: bool) {
        let Some(name) = self.scanner.scan_identifier() else {
            self.error_here("Expected label name");
            return;
        };
        let address = self.mem.get();
        if is_sub {
            let resolved = self.labels.resolve_name(&name);
            if self.labels.get(&resolved).is_some() {
                self.error_here(format!("Label '{resolved}' already exists"));
                return;
            }
        } else if self.labels.exists(&name) {
            self.error_here(format!("Label '{name}' already exists"));
            return;
        }
        let key = self.labels.add(&name, is_sub, address);
        asm_trace!(label = %key, address, "declared label");
    }

    fn pass1_literal(&mut self) {
        match self.scanner.scan_number(true) {
            Ok(Some(number)) => self.mem.move_by(1 + number.len() as u16, false),
            Ok(None) => self.error_here("Expected number after '#'"),
            Err(message) => self.error_here(message),
        }
    }

    // ---- shared ---------------------------------------------------------

    /// Reposition the memory pointer. Used identically by both passes:
    /// `|`/`$` never emit bytes, only move where the next byte lands.
    fn apply_padding(&mut self, absolute: bool) {
        match self.scanner.scan_number(false) {
            Ok(Some(number)) => self.mem.move_by(number.as_u16(), absolute),
            Ok(None) => self.error_here("Expected number after padding rune"),
            Err(message) => self.error_here(message),
        }
    }

    fn emit(&mut self, byte: u8) {
        if self.mem.is_zeropage() {
            self.error_here("Cannot write code into the zeropage");
        }
        self.code.push(byte);
        self.mem.advance_one();
    }

    // ---- pass 2 -------------------------------------------------------

    fn run_pass2(&mut self, macro_mode: bool) {
        self.scanner.skip_whitespace();
        while !self.scanner.at_end(macro_mode) {
            self.scanner.set_start();
            self.pass2_token(macro_mode);
            self.scanner.skip_whitespace();
        }
    }

    fn pass2_token(&mut self, macro_mode: bool) {
        let rune = self.scanner.peek();
        match rune {
            b'(' => {
                self.scanner.advance();
                if self.scanner.skip_comment().is_err() {
                    self.error_here("Missing closing parenthesis");
                }
            }
            b'[' | b'{' => {
                self.scanner.advance();
            }
            b']' | b'}' => {
                self.scanner.advance();
            }
            b'"' => {
                self.scanner.advance();
                match self.scanner.scan_identifier() {
                    Some(text) => {
                        for byte in text.into_bytes() {
                            self.emit(byte);
                        }
                    }
                    None => self.error_here("Expected text after '\"'"),
                }
            }
            b'%' => {
                self.scanner.advance();
                if macro_mode {
                    self.error_here("Cannot define labels or macros inside a macro body");
                }
                self.skip_macro_def();
            }
            b'@' | b'&' => {
                self.scanner.advance();
                if macro_mode {
                    self.error_here("Cannot define labels or macros inside a macro body");
                }
                self.scanner.scan_identifier();
            }
            b'|' => {
                self.scanner.advance();
                self.apply_padding(true);
            }
            b'$' => {
                self.scanner.advance();
                self.apply_padding(false);
            }
            b'#' => {
                self.scanner.advance();
                self.pass2_literal();
            }
            b'.' => {
                self.scanner.advance();
                self.pass2_reference(b'.');
            }
            b';' => {
                self.scanner.advance();
                self.pass2_reference(b';');
            }
            b'-' => {
                self.scanner.advance();
                self.pass2_reference(b'-');
            }
            b'=' => {
                self.scanner.advance();
                self.pass2_reference(b'=');
            }
            _ => self.pass2_word(),
        }
    }

    fn skip_macro_def(&mut self) {
        self.scanner.scan_identifier();
        self.scanner.skip_whitespace();
        if self.scanner.peek() == b'{' {
            self.scanner.advance();
            let _ = self.scanner.skip_until(b'}');
        }
    }

    fn pass2_literal(&mut self) {
        match self.scanner.scan_number(true) {
            Ok(Some(Number::Byte(value))) => {
                self.emit(0x80); // LIT
                self.emit(value);
            }
            Ok(Some(Number::Short(hi, lo))) => {
                self.emit(0xa0); // LIT2 (LIT | SHORT)
                self.emit(hi);
                self.emit(lo);
            }
            Ok(None) => self.error_here("Expected number after '#'"),
            Err(message) => self.error_here(message),
        }
    }

    fn pass2_reference(&mut self, rune: u8) {
        let Some(name) = self.scanner.scan_identifier() else {
            self.error_here("Expected label name");
            return;
        };
        let address = match self.labels.get_addr(&name) {
            Some(address) => address,
            None => {
                self.error_here(format!("Label '{name}' does not exist"));
                0
            }
        };
        match rune {
            b'.' => {
                if address >= crate::memory::LOAD_ADDRESS {
                    self.warn_here(format!(
                        "Zeropage reference to '{name}' resolves to 0x{}, outside the zeropage",
                        hex::encode(address.to_be_bytes())
                    ));
                }
                self.emit(0x80); // LIT
                self.emit((address & 0xff) as u8);
            }
            b'-' => {
                if address >= crate::memory::LOAD_ADDRESS {
                    self.warn_here(format!(
                        "Zeropage reference to '{name}' resolves to 0x{}, outside the zeropage",
                        hex::encode(address.to_be_bytes())
                    ));
                }
                self.emit((address & 0xff) as u8);
            }
            b';' => {
                if address < crate::memory::LOAD_ADDRESS {
                    self.warn_here(format!(
                        "Absolute reference to '{name}' resolves to 0x{}, inside the zeropage",
                        hex::encode(address.to_be_bytes())
                    ));
                }
                self.emit(0xa0); // LIT2
                let [hi, lo] = address.to_be_bytes();
                self.emit(hi);
                self.emit(lo);
            }
            b'=' => {
                if address < crate::memory::LOAD_ADDRESS {
                    self.warn_here(format!(
                        "Absolute reference to '{name}' resolves to 0x{}, inside the zeropage",
                        hex::encode(address.to_be_bytes())
                    ));
                }
                let [hi, lo] = address.to_be_bytes();
                self.emit(hi);
                self.emit(lo);
            }
            _ => unreachable!("pass2_reference called with non-reference rune"),
        }
    }

    fn pass2_word(&mut self) {
        let Some(word) = self.scanner.scan_identifier() else {
            return;
        };
        if let Some(byte) = opcodes::encode(&word) {
            self.emit(byte);
        } else if self.macros.get(&word).is_some() {
            self.expand_macro(&word);
        } else if let Some(result) = scanner::literal_number_from_str(&word) {
            match result {
                Ok(Number::Byte(value)) => self.emit(value),
                Ok(Number::Short(hi, lo)) => {
                    self.emit(hi);
                    self.emit(lo);
                }
                Err(message) => self.error_here(message),
            }
        } else {
            self.error_here(format!("Undefined identifier '{word}'"));
        }
    }

    /// Expand a macro invocation. The state stack holds two saved cursors
    /// per nesting level: the caller's position (to return to when the
    /// body is exhausted) pushed first, then the body's own start
    /// position pushed a second time. The inner `}` is never dispatched —
    /// `at_end` treats it as the loop terminator — so the body-start copy
    /// is popped once control returns here, then the caller cursor is
    /// popped and restored.
    fn expand_macro(&mut self, name: &str) {
        let body = self.macros.get(name).expect("existence checked by caller").body;
        asm_trace!(macro_name = %name, "expanding macro");

        let caller = self.scanner.save();
        self.state_stack.push(caller);
        self.scanner.jump(body);
        self.state_stack.push(self.scanner.save());

        let was_macro_mode = self.macro_mode;
        self.macro_mode = true;
        self.run_pass2(true);
        self.macro_mode = was_macro_mode;

        self.state_stack.pop(); // body-start copy, consumed by the terminator
        if let Some(caller) = self.state_stack.pop() {
            self.scanner.jump(caller);
        }
    }
}
