//! Rendering: marker line, Rust structs and constants, dump listing, render errors.

use ubxgen::codegen::{marker, struct_name, struct_names};
use ubxgen::{compile, generate, generate_from_xml, GenerateError, GenerateOptions, MaskPolicy, RenderError, Template};

const CATALOGUE: &str = include_str!("data/messages.xml");

fn rust_opts() -> GenerateOptions {
    GenerateOptions::default()
}

fn dump_opts() -> GenerateOptions {
    GenerateOptions {
        template: Template::Dump,
        ..GenerateOptions::default()
    }
}

fn one_message(payload: &str) -> String {
    format!(
        "<Definitions><Message><Name>TST-ONE</Name><Structure><Class>0x01</Class><Id>0x02</Id>\
         <Payload>{}</Payload></Structure></Message></Definitions>",
        payload
    )
}

#[test]
fn output_starts_with_marker() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.starts_with("// Code generated by ubxgen --template rust; DO NOT EDIT.\n"));
    let dump = generate_from_xml(CATALOGUE, &dump_opts()).expect("generate");
    assert!(dump.starts_with(&marker(&dump_opts())));
    assert!(dump.lines().next().unwrap().contains("--template dump"));
}

#[test]
fn marker_uses_tool_name() {
    let opts = GenerateOptions {
        tool_name: "msggen".to_string(),
        ..GenerateOptions::default()
    };
    assert_eq!(marker(&opts), "// Code generated by msggen --template rust; DO NOT EDIT.\n");
}

#[test]
fn empty_catalogue_renders_only_marker() {
    let defs = compile("<Definitions/>").expect("compile");
    let out = generate(&defs, &rust_opts()).expect("generate");
    assert_eq!(out, marker(&rust_opts()));
}

#[test]
fn rust_struct_per_message() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("pub struct Posllh {"));
    assert!(out.contains("pub struct Status {"));
    assert!(out.contains("pub struct Rawx {"));
    assert!(out.contains("pub struct Ver {"));
    let posllh = out.find("pub struct Posllh").unwrap();
    let status = out.find("pub struct Status").unwrap();
    let rawx = out.find("pub struct Rawx").unwrap();
    assert!(posllh < status && status < rawx);
}

#[test]
fn rust_fields_and_docs() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("    pub i_tow: u32,"));
    assert!(out.contains("    pub lon: i32,"));
    assert!(out.contains("    pub reserved1: [u8; 2],"));
    assert!(out.contains("    pub rcv_tow: f64,"));
    assert!(out.contains("    /// Longitude [offset 4, unit deg, scale 1e-7]"));
    assert!(out.contains("/// NAV-POSLLH (Periodic/Polled): Geodetic Position Solution"));
    assert!(out.contains("/// See important comments concerning validity of position given in section  Navigation Output Filters."));
    assert!(out.contains("/// Payload length: 16 + 32*numMeas"));
}

#[test]
fn rust_class_and_id_constants() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("impl Posllh {\n    pub const NAME: &'static str = \"NAV-POSLLH\";\n    pub const CLASS: u8 = 0x01;\n    pub const ID: u8 = 0x02;\n"));
    assert!(out.contains("    pub const CLASS: u8 = 0x0a;\n    pub const ID: u8 = 0x04;"));
}

#[test]
fn rust_bitfield_mask_constants() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("    /// position and velocity valid (bits 0)\n    pub const FLAGS_GPS_FIX_OK: u8 = 0x1;"));
    assert!(out.contains("    pub const FLAGS_DIFF_SOLN: u8 = 0x2;"));
    assert!(out.contains("    /// Bits 7:4 of `flags`.\n    pub const FLAGS_RESERVED: u8 = 0xf0;"));
}

#[test]
fn rust_repeated_group_becomes_vec_of_struct() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("    pub meas: Vec<RawxMeas>,"));
    assert!(out.contains("/// Element of `Rawx::meas`.\n#[derive(Debug, Clone, PartialEq)]\npub struct RawxMeas {"));
    assert!(out.contains("    pub pr_mes: f64,"));
    assert!(out.contains("impl RawxMeas {"));
    assert!(out.contains("    pub const TRK_STAT_PR_VALID: u8 = 0x1;"));
    assert!(out.contains("    pub const TRK_STAT_CP_VALID: u8 = 0x2;"));
    assert!(out.contains("[repeated `numMeas` times]"));
}

#[test]
fn rust_optional_block_becomes_option() {
    let out = generate_from_xml(CATALOGUE, &rust_opts()).expect("generate");
    assert!(out.contains("    pub sw_version: [u8; 30],"));
    assert!(out.contains("    pub extension: Option<[u8; 30]>,"));
}

#[test]
fn rust_singular_group_nests_struct() {
    let xml = one_message(
        "<Block><Name>pos</Name><Block><Name>x</Name><Type>I4</Type></Block><Block><Name>y</Name><Type>I4</Type></Block></Block>",
    );
    let out = generate_from_xml(&xml, &rust_opts()).expect("generate");
    assert!(out.contains("    pub pos: OnePos,"));
    assert!(out.contains("pub struct OnePos {\n    pub x: i32,\n    pub y: i32,\n}"));
}

#[test]
fn struct_name_without_category_falls_back() {
    let defs = compile(
        "<Definitions><Message><Name>ACK</Name><Structure><Class>5</Class><Id>1</Id></Structure></Message></Definitions>",
    )
    .expect("compile");
    let (_, m) = defs.messages().next().unwrap();
    assert_eq!(struct_name(m), "Ack");
}

#[test]
fn dump_lists_layout() {
    let out = generate_from_xml(CATALOGUE, &dump_opts()).expect("generate");
    assert!(out.contains("NAV-STATUS class=0x01 id=0x03 length=\"16\"\n"));
    assert!(out.contains("  [0] iTOW: U4 -> u32 (4 bytes) ms\n"));
    assert!(out.contains("  [5] flags: X1 -> u8 (1 byte)\n"));
    assert!(out.contains("      gpsFixOk 0 mask=0x1\n"));
    assert!(out.contains("      reserved 7:4 mask=0xf0\n"));
    assert!(out.contains("  repeated(numMeas) meas:\n"));
    assert!(out.contains("    [16 + 32*N] prMes: R8 -> f64 (8 bytes) m\n"));
    assert!(out.contains("  optional extension: CH[30] -> [u8; 30] (30 bytes)\n"));
    assert!(out.contains("  [4] lon: I4 -> i32 (4 bytes) deg scale=1e-7\n"));
}

#[test]
fn colliding_short_names_are_qualified_with_category() {
    let xml = "<Definitions>\
        <Message><Name>NAV-STATUS</Name><Structure><Class>0x01</Class><Id>0x03</Id>\
        <Payload><Block><Name>iTOW</Name><Type>U4</Type></Block></Payload></Structure></Message>\
        <Message><Name>ESF-STATUS</Name><Structure><Class>0x10</Class><Id>0x10</Id>\
        <Payload><Block><Name>iTOW</Name><Type>U4</Type></Block></Payload></Structure></Message>\
        <Message><Name>NAV-POSLLH</Name><Structure><Class>0x01</Class><Id>0x02</Id>\
        <Payload><Block><Name>iTOW</Name><Type>U4</Type></Block></Payload></Structure></Message>\
        </Definitions>";
    let defs = compile(xml).expect("compile");
    assert_eq!(struct_names(&defs), vec!["NavStatus", "EsfStatus", "Posllh"]);
    let out = generate(&defs, &rust_opts()).expect("generate");
    assert_eq!(out.matches("pub struct Status {").count(), 0);
    assert!(out.contains("pub struct NavStatus {"));
    assert!(out.contains("pub struct EsfStatus {"));
    assert!(out.contains("pub struct Posllh {"));
}

#[test]
fn crlf_text_leaves_no_carriage_return_in_docs() {
    let xml = "<Definitions><Message><Name>TST-ONE</Name><Description>line one\r\nline two</Description>\
               <Comment>first\r\nsecond</Comment>\
               <Structure><Class>0x01</Class><Id>0x02</Id><Payload>\
               <Block><Name>f</Name><Type>X1</Type><Comment>a\r\nb</Comment><Bitfield>\
               <Type><Index>0</Index><Name>ok</Name><Description>set\r\nwhen valid</Description></Type>\
               </Bitfield></Block></Payload></Structure></Message></Definitions>";
    let out = generate_from_xml(xml, &rust_opts()).expect("generate");
    assert!(!out.contains('\r'));
    assert!(out.contains("/// TST-ONE: line one line two\n"));
    assert!(out.contains("/// first second\n"));
    assert!(out.contains("    /// set when valid (bits 0)\n"));
}

// ==================== Render errors ====================

#[test]
fn unknown_type_code_fails_with_context() {
    let xml = one_message("<Block><Name>bad</Name><Type>Q9</Type></Block>");
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::Ctype { .. })));
    let msg = err.to_string();
    assert!(msg.contains("TST-ONE"), "{msg}");
    assert!(msg.contains("Q9"), "{msg}");
    assert!(generate_from_xml(&xml, &dump_opts()).is_err());
}

#[test]
fn block_without_type_or_nested_fails() {
    let xml = one_message("<Block><Name>nothing</Name></Block>");
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::EmptyBlock { .. })));
}

#[test]
fn bitfield_on_float_fails() {
    let xml = one_message(
        "<Block><Name>f</Name><Type>R4</Type><Bitfield><Type><Index>0</Index><Name>b</Name></Type></Bitfield></Block>",
    );
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::BitfieldType { .. })));
}

#[test]
fn mask_wider_than_field_fails() {
    let xml = one_message(
        "<Block><Name>f</Name><Type>X1</Type><Bitfield><Type><Index>8</Index><Name>b</Name></Type></Bitfield></Block>",
    );
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::MaskTooWide { .. })));
}

#[test]
fn malformed_bit_index_fails_strict_and_passes_lenient() {
    let xml = one_message(
        "<Block><Name>f</Name><Type>X1</Type><Bitfield><Type><Index>7:x</Index><Name>b</Name></Type></Bitfield></Block>",
    );
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::Mask { .. })));

    let lenient = GenerateOptions {
        mask_policy: MaskPolicy::Lenient,
        ..GenerateOptions::default()
    };
    let out = generate_from_xml(&xml, &lenient).expect("lenient");
    assert!(out.contains("pub const F_B: u8 = 0xff;"));
}

#[test]
fn discriminator_above_a_byte_fails() {
    let xml = "<Definitions><Message><Name>TST-BIG</Name><Structure><Class>0x100</Class><Id>1</Id>\
               </Structure></Message></Definitions>";
    let err = generate_from_xml(xml, &rust_opts()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Render(RenderError::DiscriminatorRange { field: "class", value: 0x100, .. })
    ));
}

#[test]
fn schema_errors_surface_through_generate() {
    let xml = "<Definitions><Message><Name>TST-ONE</Name><Structure><Class>xyz</Class><Id>1</Id></Structure></Message></Definitions>";
    let err = generate_from_xml(xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Schema(_)));
}

#[test]
fn duplicate_bit_names_fail() {
    let xml = one_message(
        "<Block><Name>f</Name><Type>X1</Type><Bitfield>\
         <Type><Index>0</Index><Name>a</Name></Type><Type><Index>1</Index><Name>a</Name></Type>\
         </Bitfield></Block>",
    );
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Render(RenderError::DuplicateIdent { kind: "constant", ref ident, .. }) if ident == "F_A"
    ));
}

#[test]
fn unnamed_bits_collide() {
    let xml = one_message(
        "<Block><Name>f</Name><Type>X1</Type><Bitfield>\
         <Type><Index>0</Index></Type><Type><Index>1</Index></Type>\
         </Bitfield></Block>",
    );
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(err, GenerateError::Render(RenderError::DuplicateIdent { kind: "constant", .. })));
}

#[test]
fn duplicate_field_names_fail() {
    let xml = one_message("<Block><Name>x</Name><Type>U1</Type></Block><Block><Name>x</Name><Type>U2</Type></Block>");
    let err = generate_from_xml(&xml, &rust_opts()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Render(RenderError::DuplicateIdent { kind: "field", ref ident, .. }) if ident == "x"
    ));
    assert!(err.to_string().contains("duplicate field `x`"));
}

#[test]
fn group_struct_clashing_with_message_struct_fails() {
    let xml = "<Definitions>\
        <Message><Name>TST-ONE</Name><Structure><Class>1</Class><Id>1</Id><Payload>\
        <Block><Name>pos</Name><Block><Name>x</Name><Type>I4</Type></Block></Block>\
        </Payload></Structure></Message>\
        <Message><Name>TST-ONE-POS</Name><Structure><Class>1</Class><Id>2</Id></Structure></Message>\
        </Definitions>";
    let err = generate_from_xml(xml, &rust_opts()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Render(RenderError::DuplicateIdent { kind: "struct", ref ident, .. }) if ident == "OnePos"
    ));
}
