use crate::cmd;
use crate::env::ESBUILD_BIN;
use crate::error::Error;

/// Content transformation capability, one call per file (§4.2). Dynamic
/// dispatch cost is negligible at that call rate, so a plain enum stands in
/// for a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformer {
    Passthrough,
    Minify,
}

impl Transformer {
    /// Picks Minify only in production mode, for css/js, otherwise
    /// Passthrough (§4.2 "Selection").
    pub fn select(is_production: bool, extension: &str) -> Self {
        if is_production && matches!(extension, "css" | "js") {
            Transformer::Minify
        } else {
            Transformer::Passthrough
        }
    }

    pub async fn transform(self, raw: &[u8], extension: &str) -> Result<Vec<u8>, Error> {
        match self {
            Transformer::Passthrough => Ok(raw.to_vec()),
            Transformer::Minify => minify(raw, extension).await,
        }
    }
}

/// Shells out to `esbuild` with `--minify-whitespace --minify-syntax`.
/// Identifiers are never mangled (`--minify-identifiers` is intentionally
/// omitted) so spliced output keeps referring to the same external names
/// (§4.2 "Identifier preservation is mandatory").
async fn minify(raw: &[u8], extension: &str) -> Result<Vec<u8>, Error> {
    if !matches!(extension, "css" | "js") {
        return Ok(raw.to_vec());
    }

    let loader = format!("--loader={extension}");
    let args = ["--minify-whitespace", "--minify-syntax", loader.as_str()];

    let output = cmd::run_piped(ESBUILD_BIN.as_str(), &args, raw)
        .await
        .map_err(|e| Error::MinifyFailed {
            diagnostic: format!("failed to spawn {}: {e}", ESBUILD_BIN.as_str()),
        })?;

    if !output.status_success {
        return Err(Error::MinifyFailed {
            diagnostic: output.stderr.trim().to_string(),
        });
    }

    Ok(output.stdout)
}
