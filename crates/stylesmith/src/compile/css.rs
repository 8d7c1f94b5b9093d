//! CSS text output.

use std::fmt::{self, Write};

use super::{CompiledRule, CompiledStylesheet};

const INDENT: &str = "  ";

impl CompiledRule {
    fn write_css(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "{} {{", self.selector)?;
        for decl in &self.declarations {
            writeln!(out, "{}{}: {};", INDENT, decl.property, decl.value)?;
        }
        writeln!(out, "}}")
    }
}

impl CompiledStylesheet {
    /// Renders the rules as CSS text, one blank line between rules.
    ///
    /// ```rust
    /// use stylesmith::{Compiler, StyleNode, StyleTree};
    ///
    /// let tree = StyleTree::new().root(StyleNode::new(".x").declare("color", "red"));
    /// let css = Compiler::new().compile(&tree).unwrap().to_css();
    /// assert_eq!(css, ".x {\n  color: red;\n}\n");
    /// ```
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_css(f)
    }
}

impl fmt::Display for CompiledStylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            rule.write_css(f)?;
        }
        Ok(())
    }
}
