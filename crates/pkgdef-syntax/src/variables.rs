//! The predefined `$Variable$` catalog.
//!
//! These are the substitution variables the host expands when it applies a
//! pkgdef file. Lookups are case-insensitive.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const CATALOG: [(&str, &str); 14] = [
    ("AppDataLocalFolder", "The per-user local application data folder of the application"),
    ("AppName", "The qualified name of the application"),
    ("ApplicationExtensionsFolder", "The folder where extensions shipped with the application are installed"),
    ("BaseInstallDir", "The full path of the location where the application was installed"),
    ("CommonFiles", "The value of the %CommonProgramFiles% environment variable"),
    ("Initialization", "The folder holding initialization settings of the application"),
    ("MyDocuments", "The full path of the My Documents folder of the current user"),
    ("PackageFolder", "The folder containing the package assembly and its pkgdef file"),
    ("ProgramFiles", "The value of the %ProgramFiles% environment variable"),
    ("RootFolder", "The root directory of the application installation"),
    ("RootKey", "The root registry key of the application"),
    ("ShellFolder", "The full path of the shell folder of the application"),
    ("System", "The Windows\\System32 folder"),
    ("WinDir", "The Windows folder"),
];

static BY_NAME: Lazy<HashMap<String, (&'static str, &'static str)>> = Lazy::new(|| {
    let mut m = HashMap::with_capacity(CATALOG.len());
    for (name, description) in CATALOG {
        m.insert(name.to_ascii_lowercase(), (name, description));
    }
    m
});

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub name: &'static str,
    pub description: &'static str,
}

/// All predefined variables, sorted by name.
pub fn all() -> impl Iterator<Item = Variable> {
    CATALOG
        .iter()
        .map(|&(name, description)| Variable { name, description })
}

/// Finds a variable by name, ignoring case.
pub fn lookup(name: &str) -> Option<Variable> {
    BY_NAME
        .get(&name.to_ascii_lowercase())
        .map(|&(name, description)| Variable { name, description })
}

pub fn is_defined(name: &str) -> bool {
    lookup(name).is_some()
}

/// Variables whose name starts with `prefix`, ignoring case.
pub fn complete(prefix: &str) -> Vec<Variable> {
    let prefix = prefix.to_ascii_lowercase();
    all()
        .filter(|v| v.name.to_ascii_lowercase().starts_with(&prefix))
        .collect()
}
