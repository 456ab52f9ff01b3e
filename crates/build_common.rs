// Shared build script helpers that turn a crate README into its rustdoc.
// Include this in build.rs files with: include!("../build_common.rs");
//
// Required imports in the including file:
//   use std::env;
//   use std::fs;
//   use std::path::Path;

/// Write `README_GENERATED.md` into `OUT_DIR` for `#![doc = include_str!(…)]`.
///
/// Transformations:
/// 1. Strip the `src/` prefix and `.rs` suffix from links so rustdoc resolves
///    them as module paths
/// 2. Point `../../README.md` links at the repository URL from the workspace
///    manifest
///
/// A crate without a README still gets a one-line doc so the include never
/// fails.
fn process_readme_for_rustdoc(crate_dir: &str) {
    println!("cargo:rerun-if-changed=README.md");
    println!("cargo:rerun-if-changed=../../Cargo.toml");

    let readme_path = Path::new(crate_dir).join("README.md");
    let rustdoc_content = match fs::read_to_string(&readme_path) {
        Ok(content) => rewrite_links(&content, workspace_repo_url(crate_dir).as_deref()),
        Err(_) => format!(
            "{}\n",
            env::var("CARGO_PKG_DESCRIPTION").unwrap_or_default()
        ),
    };

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("README_GENERATED.md");
    fs::write(dest_path, rustdoc_content).expect("OUT_DIR is writable");
}

fn rewrite_links(content: &str, repo_url: Option<&str>) -> String {
    let rewritten = content.replace("](src/", "](").replace(".rs)", ")");
    match repo_url {
        Some(url) => rewritten.replace("](../../README.md", &format!("]({url}")),
        None => rewritten,
    }
}

/// Read `repository = "…"` from the workspace manifest two levels up.
fn workspace_repo_url(crate_dir: &str) -> Option<String> {
    let workspace_toml = Path::new(crate_dir).parent()?.parent()?.join("Cargo.toml");
    let content = fs::read_to_string(workspace_toml).ok()?;

    content.lines().map(str::trim).find_map(|line| {
        if !line.starts_with("repository") || !line.contains('=') {
            return None;
        }
        let start = line.find('"')?;
        let end = line.rfind('"')?;
        (start < end).then(|| line[start + 1..end].to_string())
    })
}
