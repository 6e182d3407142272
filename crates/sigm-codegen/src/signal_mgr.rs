//! Native signal manager emitter.
//!
//! One static storage slot plus a getter and a setter per signal, in the
//! project's signal order. Output depends on nothing but the project, so
//! two runs over the same project are byte-identical.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sigm_model::{BaseType, Project, Signal};

use crate::error::{GenerateError, Result};
use crate::generator::{Generator, write_artifact};
use crate::kind::GeneratorKind;

pub const SOURCE_FILE: &str = "signal_mgr.c";
pub const HEADER_FILE: &str = "signal_mgr.h";

const SOURCE_BANNER: &str = "/* Auto-generated Signal Manager Code */\n\
#include <stdio.h>\n\
#include <stdlib.h>\n\
#include \"signal_mgr.h\"\n";

/// Writes `signal_mgr.c` and `signal_mgr.h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalMgrGenerator;

impl Generator for SignalMgrGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::SignalMgr
    }

    fn generate(&self, project: &Project, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let source = render_source(project)?;
        let header = render_header(project)?;
        Ok(vec![
            write_artifact(output_dir, SOURCE_FILE, &source)?,
            write_artifact(output_dir, HEADER_FILE, &header)?,
        ])
    }
}

/// A signal ready for emission: C name, C type and initializer.
struct Slot<'a> {
    name: &'a str,
    c_type: String,
    init: &'a str,
}

fn slots(project: &Project) -> Result<Vec<Slot<'_>>> {
    project
        .signals
        .iter()
        .map(|(name, signal)| slot(name, signal))
        .collect()
}

fn slot<'a>(name: &'a str, signal: &'a Signal) -> Result<Slot<'a>> {
    if !is_c_identifier(name) {
        return Err(GenerateError::invalid(format!(
            "signal name '{name}' is not a valid C identifier"
        )));
    }
    let init = signal.init_expr().ok_or_else(|| {
        GenerateError::invalid(format!(
            "signal '{name}' uses a custom initial value but none is set"
        ))
    })?;
    Ok(Slot {
        name,
        c_type: signal.data_type.c_spelling(),
        init,
    })
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The translation unit.
pub fn render_source(project: &Project) -> Result<String> {
    let mut out = String::from(SOURCE_BANNER);
    for Slot { name, c_type, init } in slots(project)? {
        let _ = write!(
            out,
            "\n\
static {c_type} {name}_value = {init};\n\
{c_type} get_{name}(void)\n\
{{\n\
\x20   return {name}_value;\n\
}}\n\
void set_{name}({c_type} value)\n\
{{\n\
\x20   {name}_value = value;\n\
}}\n"
        );
    }
    Ok(out)
}

/// C spelling behind each base type token.
fn typedef_target(base: BaseType) -> &'static str {
    match base {
        BaseType::Int8 => "int8_t",
        BaseType::Uint8 | BaseType::Boolean => "uint8_t",
        BaseType::Int16 => "int16_t",
        BaseType::Uint16 => "uint16_t",
        BaseType::Int32 => "int32_t",
        BaseType::Uint32 => "uint32_t",
        BaseType::Int64 => "int64_t",
        BaseType::Uint64 => "uint64_t",
        BaseType::Float32 => "float",
        BaseType::Float64 => "double",
        BaseType::Char => "char",
        BaseType::String => "const char *",
    }
}

/// Type definitions and accessor prototypes.
pub fn render_header(project: &Project) -> Result<String> {
    let mut out = String::from(
        "/* Auto-generated Signal Manager Header */\n\
#ifndef SIGNAL_MGR_H\n\
#define SIGNAL_MGR_H\n\
\n\
#include <stdint.h>\n\
\n\
/* Base type definitions */\n",
    );
    for base in BaseType::ALL {
        let target = typedef_target(*base);
        let separator = if target.ends_with('*') { "" } else { " " };
        let _ = writeln!(out, "typedef {target}{separator}{};", base.c_token());
    }

    out.push_str("\n/* Signal accessors */\n");
    for Slot { name, c_type, .. } in slots(project)? {
        let _ = writeln!(out, "{c_type} get_{name}(void);");
        let _ = writeln!(out, "void set_{name}({c_type} value);");
    }
    out.push_str("\n#endif /* SIGNAL_MGR_H */\n");
    Ok(out)
}
