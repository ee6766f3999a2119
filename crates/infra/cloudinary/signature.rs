use anyhow::{Result, bail};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Digest used for signed upload requests. Must match the account's configured algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => bail!("unsupported signature algorithm: {}", other),
        }
    }
}

/// Signs request parameters: `k1=v1&k2=v2` in key order, with the API secret appended,
/// hex-encoded. Empty values are left out, as the service does when verifying.
pub fn sign_params(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{}{}", to_sign, api_secret);

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documented_params() -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
        ])
    }

    #[test]
    fn signs_with_sha1() {
        let signature = sign_params(&documented_params(), "abcd", SignatureAlgorithm::Sha1);
        assert_eq!(signature, "b4ad47fb4e25c7bf5f92a20089f9db59bc302313");
    }

    #[test]
    fn signs_with_sha256() {
        let signature = sign_params(&documented_params(), "abcd", SignatureAlgorithm::Sha256);
        assert_eq!(
            signature,
            "e3c44b54e67a3ecc918f5d7236ca5faa36250ea8a8cd6cbabfd2d6bb2453acac"
        );
    }

    #[test]
    fn skips_empty_values() {
        let mut params = documented_params();
        params.insert("folder", String::new());

        let signature = sign_params(&params, "abcd", SignatureAlgorithm::Sha1);

        assert_eq!(signature, "b4ad47fb4e25c7bf5f92a20089f9db59bc302313");
    }

    #[test]
    fn parses_algorithm_names() {
        assert_eq!(
            "SHA256".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::Sha256
        );
        assert_eq!(
            "sha-1".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::Sha1
        );
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }
}
