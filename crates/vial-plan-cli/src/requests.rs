//! Request list input: `DRUG=DOSE` arguments and TOML request files.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use vial_plan_core::RequestList;

/// A TOML request file:
///
/// ```toml
/// [[request]]
/// drug = "Rituximab"
/// dose_mg = 700
/// ```
#[derive(Debug, Deserialize)]
struct RequestFile {
    #[serde(default, rename = "request")]
    requests: Vec<RequestEntry>,
}

#[derive(Debug, Deserialize)]
struct RequestEntry {
    drug: String,
    dose_mg: f64,
}

/// Parse a `DRUG=DOSE` argument. The drug name may itself contain `=`.
pub fn parse_request_arg(arg: &str) -> Result<(String, f64)> {
    let (drug, dose) = arg
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected DRUG=DOSE, got {:?}", arg))?;
    let drug = drug.trim();
    if drug.is_empty() {
        return Err(anyhow!("missing drug name in {:?}", arg));
    }
    let dose: f64 = dose
        .trim()
        .parse()
        .with_context(|| format!("invalid dose in {:?}", arg))?;
    Ok((drug.to_string(), dose))
}

/// Append the requests of a TOML document to `list`.
pub fn load_request_str(list: &mut RequestList, contents: &str) -> Result<usize> {
    let file: RequestFile = toml::from_str(contents).context("parsing request file")?;
    let count = file.requests.len();
    for entry in file.requests {
        list.add(entry.drug, entry.dose_mg);
    }
    Ok(count)
}

pub fn load_request_file(list: &mut RequestList, path: &Path) -> Result<usize> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading request file {}", path.display()))?;
    load_request_str(list, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_arg() {
        assert_eq!(
            parse_request_arg("Rituximab=700").unwrap(),
            ("Rituximab".to_string(), 700.0)
        );
        assert_eq!(
            parse_request_arg(" Drug A = 12.5 ").unwrap(),
            ("Drug A".to_string(), 12.5)
        );
        assert_eq!(
            parse_request_arg("a=b=3").unwrap(),
            ("a=b".to_string(), 3.0)
        );
    }

    #[test]
    fn test_parse_request_arg_errors() {
        assert!(parse_request_arg("Rituximab").is_err());
        assert!(parse_request_arg("=700").is_err());
        assert!(parse_request_arg("Rituximab=lots").is_err());
    }

    #[test]
    fn test_load_request_str_keeps_order() {
        let mut list = RequestList::new();
        let count = load_request_str(
            &mut list,
            r#"
            [[request]]
            drug = "Rituximab"
            dose_mg = 700

            [[request]]
            drug = "Trastuzumab"
            dose_mg = 440.5
            "#,
        )
        .unwrap();

        assert_eq!(count, 2);
        let drugs: Vec<&str> = list.iter().map(|r| r.drug.as_str()).collect();
        assert_eq!(drugs, vec!["Rituximab", "Trastuzumab"]);
        assert_eq!(list.snapshot()[1].dose_mg, 440.5);
    }

    #[test]
    fn test_load_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.toml");
        std::fs::write(&path, "[[request]]\ndrug = \"X\"\ndose_mg = 1.5\n").unwrap();

        let mut list = RequestList::new();
        assert_eq!(load_request_file(&mut list, &path).unwrap(), 1);
        assert!(load_request_file(&mut list, &dir.path().join("missing.toml")).is_err());
    }
}
