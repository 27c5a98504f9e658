use std::path::Path;

use crate::error::Error;

/// Builds the exact guard-marker text for a given marker name (§3).
pub fn begin_marker(marker_name: &str) -> String {
    format!("/* [{marker_name}] BEGIN - Do not edit! This section is auto-generated. */")
}

pub fn end_marker(marker_name: &str) -> String {
    format!("/* [{marker_name}] END */")
}

/// Reads `target_path`, splices `new_content` between its guard markers, and
/// atomically overwrites it. A file with neither marker present is a no-op
/// success (not yet adopted by this marker name); a file with exactly one
/// marker, or BEGIN after END, is `InvalidMarkers` (§4.3).
pub async fn splice(target_path: &Path, new_content: &[u8], marker_name: &str) -> Result<(), Error> {
    let raw = tokio::fs::read(target_path)
        .await
        .map_err(|source| Error::ReadTarget {
            path: target_path.to_path_buf(),
            source,
        })?;
    let text = String::from_utf8_lossy(&raw).into_owned();

    let begin = begin_marker(marker_name);
    let end = end_marker(marker_name);

    let begin_pos = text.find(&begin);
    let end_pos = text.find(&end);

    let (begin_pos, end_pos) = match (begin_pos, end_pos) {
        (None, None) => return Ok(()),
        (Some(b), Some(e)) if b < e => (b, e),
        _ => {
            return Err(Error::InvalidMarkers {
                path: target_path.to_path_buf(),
            })
        }
    };

    let begin_end = begin_pos + begin.len();
    let prefix = text[..begin_end].trim_end_matches(|c: char| c.is_whitespace());
    let suffix = text[end_pos..].trim_start_matches(|c: char| c.is_whitespace());

    let new_content = String::from_utf8_lossy(new_content);
    let result = format!("{prefix}\n{new_content}\n{suffix}");

    if let Some(parent) = target_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::SpliceWrite {
                path: target_path.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(target_path, result.as_bytes())
        .await
        .map_err(|source| Error::SpliceWrite {
            path: target_path.to_path_buf(),
            source,
        })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o644);
        let _ = tokio::fs::set_permissions(target_path, perms).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_templ(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, body).await.unwrap();
        path
    }

    #[tokio::test]
    async fn splices_between_markers_and_preserves_them() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "before\n{}\nold\n{}\nafter\n",
            begin_marker("APP"),
            end_marker("APP")
        );
        let path = write_templ(&dir, "a.templ", &body).await;

        splice(&path, b"body{color:red}", "APP").await.unwrap();

        let out = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(out.contains(&begin_marker("APP")));
        assert!(out.contains(&end_marker("APP")));
        assert!(out.contains("body{color:red}"));
        assert!(!out.contains("old"));
    }

    #[tokio::test]
    async fn missing_end_marker_is_invalid() {
        let dir = TempDir::new().unwrap();
        let body = format!("{}\nonly begin\n", begin_marker("APP"));
        let path = write_templ(&dir, "a.templ", &body).await;

        let err = splice(&path, b"x", "APP").await.unwrap_err();
        assert!(matches!(err, Error::InvalidMarkers { .. }));
    }

    #[tokio::test]
    async fn neither_marker_present_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let body = "just plain text\n".to_string();
        let path = write_templ(&dir, "a.templ", &body).await;

        splice(&path, b"x", "APP").await.unwrap();

        let out = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(out, body);
    }
}
