//! Managed-runtime symbol conventions.
//!
//! perf cannot tell a JIT-compiled method from a native function; the only
//! signal is how the symbol is spelled. The check lives behind
//! `SymbolConvention` so it can be swapped without touching storage or the
//! general hotspot query.
//!
//! - `ScopeSeparator` accepts any symbol containing a scope token (`::` by
//!   default). It also matches C++ and Rust symbols.
//! - `JvmPerfMap` accepts only the `L<class>;::<method>` form written by JVM
//!   perf-map agents, e.g. `LTestFibonacci;::fibonacci`.

use crate::utils::config::DEFAULT_SCOPE_SEPARATOR;
use clap::ValueEnum;

/// Predicate deciding which symbols belong to a managed runtime
pub trait SymbolConvention {
    /// Short name recorded in reports
    fn name(&self) -> &str;

    fn is_managed(&self, symbol: &str) -> bool;

    /// Human-readable form for display; the stored symbol is unchanged
    fn display_name(&self, symbol: &str) -> String {
        symbol.to_string()
    }
}

/// Matches symbols containing a scope separator token
#[derive(Debug, Clone)]
pub struct ScopeSeparator {
    separator: String,
}

impl ScopeSeparator {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for ScopeSeparator {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_SEPARATOR)
    }
}

impl SymbolConvention for ScopeSeparator {
    fn name(&self) -> &str {
        "scope"
    }

    fn is_managed(&self, symbol: &str) -> bool {
        !self.separator.is_empty() && symbol.contains(&self.separator)
    }

    fn display_name(&self, symbol: &str) -> String {
        jvm_display_name(symbol).unwrap_or_else(|| symbol.to_string())
    }
}

/// Matches JVM perf-map method symbols (`L<class>;::<method>`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JvmPerfMap;

impl SymbolConvention for JvmPerfMap {
    fn name(&self) -> &str {
        "jvm"
    }

    fn is_managed(&self, symbol: &str) -> bool {
        jvm_display_name(symbol).is_some()
    }

    fn display_name(&self, symbol: &str) -> String {
        jvm_display_name(symbol).unwrap_or_else(|| symbol.to_string())
    }
}

/// `Ljava/lang/String;::hashCode` -> `java.lang.String.hashCode`
///
/// `None` when the symbol is not in perf-map form.
pub fn jvm_display_name(symbol: &str) -> Option<String> {
    let (class, method) = symbol.strip_prefix('L')?.split_once(";::")?;
    if class.is_empty() || method.is_empty() {
        return None;
    }
    Some(format!("{}.{}", class.replace('/', "."), method))
}

/// Selectable conventions for configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConventionKind {
    /// Any symbol containing the scope separator
    #[default]
    Scope,
    /// Only JVM perf-map method symbols
    Jvm,
}

/// Build the convention selected in configuration
///
/// `separator` is only used by `ConventionKind::Scope`.
pub fn build_convention(kind: ConventionKind, separator: &str) -> Box<dyn SymbolConvention> {
    match kind {
        ConventionKind::Scope => Box::new(ScopeSeparator::new(separator)),
        ConventionKind::Jvm => Box::new(JvmPerfMap),
    }
}
