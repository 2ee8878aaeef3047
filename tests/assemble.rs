//! End-to-end assembly scenarios, run through the public `assemble` entry
//! point exactly as a caller of the library would use it.

use pretty_assertions::assert_eq;
use uxntal_asm::assemble;

#[test]
fn s1_literals_and_add() {
    let output = assemble("|0100 #01 #02 ADD BRK");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0x80, 0x01, 0x80, 0x02, 0x18, 0x00]);
}

#[test]
fn s2_label_reference_and_short_mode_opcodes() {
    let output = assemble("|0100 @loop INC2 ;loop JMP2 BRK");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0x21, 0xa0, 0x01, 0x00, 0x2c, 0x00]);
    assert_eq!(output.label_count, 1);
}

#[test]
fn s3_macro_definition_and_invocation() {
    let output = assemble("%double { #02 MUL } |0100 #03 double BRK");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0x80, 0x03, 0x80, 0x02, 0x1a, 0x00]);
    assert_eq!(output.macro_count, 1);
}

#[test]
fn s4_raw_string_terminated_by_whitespace() {
    let output = assemble(r#"|0100 "hi BRK"#);
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0x68, 0x69, 0x00]);
}

#[test]
fn s5_undefined_label_reports_exact_error_and_no_usable_output() {
    let output = assemble("|0100 .nope");
    assert!(output.diagnostics.had_error());
    let rendered = output.diagnostics.records()[0].to_string();
    assert_eq!(rendered, "Error (1,7): Label 'nope' does not exist.");
}

#[test]
fn s6_sublabel_declared_and_resolved_fully_qualified() {
    let output = assemble("|0100 @a &b ;a/b BRK");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0xa0, 0x01, 0x00, 0x00]);
    assert_eq!(output.label_count, 2);
}

#[test]
fn sublabel_resolved_via_ampersand_scoped_reference() {
    let output = assemble("|0100 @a &b ;&b BRK");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0xa0, 0x01, 0x00, 0x00]);
}

#[test]
fn duplicate_main_label_is_an_error() {
    let output = assemble("|0100 @start BRK @start BRK");
    assert!(output.diagnostics.had_error());
    assert!(output.diagnostics.records()[0]
        .message
        .contains("already exists"));
}

#[test]
fn duplicate_sublabel_under_same_main_is_an_error() {
    let output = assemble("|0100 @a &b BRK &b BRK");
    assert!(output.diagnostics.had_error());
}

#[test]
fn unterminated_comment_is_an_error() {
    let output = assemble("|0100 ( this never closes BRK");
    assert!(output.diagnostics.had_error());
}

#[test]
fn unterminated_macro_body_is_an_error() {
    let output = assemble("%broken { #01 |0100 BRK");
    assert!(output.diagnostics.had_error());
}

#[test]
fn label_declared_inside_macro_body_is_rejected() {
    let output = assemble("%bad { @inner BRK } |0100 bad BRK");
    assert!(output.diagnostics.had_error());
    assert!(output
        .diagnostics
        .records()
        .iter()
        .any(|d| d.message.contains("inside a macro body")));
}

#[test]
fn macro_defined_inside_macro_body_is_rejected() {
    let output = assemble("%bad { %inner { BRK } BRK } |0100 bad BRK");
    assert!(output.diagnostics.had_error());
}

#[test]
fn number_literal_wider_than_a_short_is_an_error() {
    let output = assemble("|0100 #00001");
    assert!(output.diagnostics.had_error());
    assert!(output.diagnostics.records()[0].message.contains("too big"));
}

#[test]
fn writing_below_the_load_address_is_flagged() {
    let output = assemble("|0000 BRK");
    assert!(output.diagnostics.had_error());
    assert!(output.diagnostics.records()[0]
        .message
        .contains("zeropage"));
}

#[test]
fn errors_suppress_output_but_not_the_diagnostics_themselves() {
    let output = assemble("|0100 .nope BRK ;alsomissing");
    assert!(output.diagnostics.had_error());
    // Both label failures are errors, so both are still reported; it's
    // only warnings that get suppressed once hadError is set.
    assert_eq!(output.diagnostics.records().len(), 2);
}

#[test]
fn empty_source_assembles_to_an_empty_rom_without_errors() {
    let output = assemble("");
    assert!(!output.diagnostics.had_error());
    assert!(output.code.is_empty());
}

#[test]
fn comments_and_ornamental_brackets_are_fully_transparent() {
    let output = assemble("|0100 (a comment) [ BRK ]");
    assert!(!output.diagnostics.had_error());
    assert_eq!(output.code, vec![0x00]);
}
