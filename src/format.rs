//! Serializer for declaration files.
//!
//! The edited text is parsed once more and printed with `oxc_codegen`, so the output only
//! depends on the syntax tree and not on which edits produced it. Comments are kept.

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::{Codegen, CodegenOptions, IndentChar};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::source::parse_program;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Print string literals with `'`.
    pub single_quote: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            single_quote: true,
        }
    }
}

impl FormatOptions {
    fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            single_quote: self.single_quote,
            indent_char: IndentChar::Space,
            indent_width: self.indent_width,
            ..CodegenOptions::default()
        }
    }
}

/// Prints a parsed program.
pub fn print_program(program: &Program, options: &FormatOptions) -> String {
    Codegen::new()
        .with_options(options.codegen_options())
        .build(program)
        .code
}

/// Regenerates `code` and checks that the printed text parses again.
pub fn serialize(code: &str, options: &FormatOptions, file: &str) -> Result<String> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, code, file)?;
    let printed = print_program(&program, options);

    let check = Allocator::default();
    parse_program(&check, &printed, file)?;
    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_declaration;

    fn fmt(code: &str) -> String {
        serialize(code, &FormatOptions::default(), "api.ts").unwrap()
    }

    const API: &str = "namespace nasl.ui {\nexport class Foo extends ViewComponent {}\nexport class FooOptions extends ViewComponentOptions {\n@Prop({ title: 'line one \\\n      line two' })\na: any;\n@Prop({ title: \"B\" }) b: nasl.core.Integer = 1;\n}\n}\n";

    #[test]
    fn test_multiline_string_keeps_its_value() {
        let before = read_declaration(API, "api.ts").unwrap();
        let after = read_declaration(&fmt(API), "api.ts").unwrap();
        assert_eq!(before[0].props[0].title, "line one       line two");
        assert_eq!(after[0].props[0].title, before[0].props[0].title);
        assert_eq!(after[0].props[1].default_value.as_deref(), Some("1"));
    }

    #[test]
    fn test_is_idempotent() {
        let once = fmt(API);
        assert_eq!(fmt(&once), once);
    }

    #[test]
    fn test_output_does_not_depend_on_layout() {
        let spread = "class A {\n\n\n    a = 1;\n\n  b = 'x';\n}\n";
        let packed = "class A { a = 1; b = \"x\" }";
        assert_eq!(fmt(spread), fmt(packed));
        assert!(fmt(packed).contains("'x'"));
    }

    #[test]
    fn test_keeps_comments() {
        let code = "/// <reference types=\"@nasl/types\" />\n/** Shared value. */\nexport const a = 1;\n";
        let out = fmt(code);
        assert!(out.contains("/// <reference types=\"@nasl/types\" />"));
        assert!(out.contains("/** Shared value. */"));
    }

    #[test]
    fn test_indent_width() {
        let code = "class A {\na = 1;\n}\n";
        let out = serialize(
            code,
            &FormatOptions {
                indent_width: 4,
                ..Default::default()
            },
            "api.ts",
        )
        .unwrap();
        assert!(out.contains("\n    a = 1;"));
    }

    #[test]
    fn test_serialize_rejects_broken_text() {
        let err = serialize("class A {", &FormatOptions::default(), "api.ts").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_options_from_json() {
        let options: FormatOptions = serde_json::from_str(r#"{ "indentWidth": 4 }"#).unwrap();
        assert_eq!(options.indent_width, 4);
        assert!(options.single_quote);
    }
}
