//! SigV4 presigner and minimal client for S3-compatible stores.
//!
//! Uploads use the pre-signed PUT path; the service never relays object
//! bytes. The list and delete calls back the reconciliation sweep and sign
//! the same way. Signing follows the AWS Signature Version 4
//! query-parameter scheme with `UNSIGNED-PAYLOAD`; pre-signed PUTs include
//! the content type in the signed headers so the client must upload with
//! the declared type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::StorageConfig;
use crate::storage::{ObjectStore, StorageError, StoredObject};

type HmacSha256 = Hmac<Sha256>;

/// TTL of the URLs this process signs for its own list/delete calls.
const INTERNAL_URL_TTL_SECS: u64 = 60;

pub struct S3ObjectStore {
    config: StorageConfig,
    http_client: reqwest::Client,
}

impl S3ObjectStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Presigns against an explicit timestamp; the trait methods supply the
    /// current time.
    fn presign_at(
        &self,
        key: &str,
        content_type: &str,
        expires_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        self.presign(
            "PUT",
            Some(key),
            &[],
            Some(content_type),
            expires_secs,
            now,
        )
    }

    fn presign(
        &self,
        method: &str,
        key: Option<&str>,
        extra_query: &[(&str, &str)],
        content_type: Option<&str>,
        expires_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        if self.config.access_key_id.is_empty() || self.config.secret_access_key.is_empty() {
            return Err(StorageError::NotConfigured(
                "missing S3 credentials".to_string(),
            ));
        }

        let (scheme, host) = self
            .config
            .endpoint
            .split_once("://")
            .ok_or_else(|| StorageError::InvalidEndpoint(self.config.endpoint.clone()))?;
        if host.is_empty() {
            return Err(StorageError::InvalidEndpoint(self.config.endpoint.clone()));
        }

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/s3/aws4_request", datestamp, self.config.region);

        // Path-style addressing works for AWS and for local S3 clones alike
        let path = match key {
            Some(key) => format!(
                "/{}/{}",
                uri_encode(&self.config.bucket, false),
                uri_encode(key, false)
            ),
            None => format!("/{}", uri_encode(&self.config.bucket, false)),
        };

        let credential = format!("{}/{}", self.config.access_key_id, scope);
        let signed_headers = if content_type.is_some() {
            "content-type;host"
        } else {
            "host"
        };

        // Canonical query parameters must appear in ascending order
        let mut query: Vec<(String, String)> = vec![
            (
                "X-Amz-Algorithm".to_string(),
                "AWS4-HMAC-SHA256".to_string(),
            ),
            ("X-Amz-Credential".to_string(), uri_encode(&credential, true)),
            ("X-Amz-Date".to_string(), amz_date.clone()),
            ("X-Amz-Expires".to_string(), expires_secs.to_string()),
            (
                "X-Amz-SignedHeaders".to_string(),
                uri_encode(signed_headers, true),
            ),
        ];
        for (name, value) in extra_query {
            query.push((uri_encode(name, true), uri_encode(value, true)));
        }
        query.sort();
        let canonical_query = query
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_headers = match content_type {
            Some(content_type) => {
                format!("content-type:{}\nhost:{}\n", content_type.trim(), host)
            }
            None => format!("host:{}\n", host),
        };
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\nUNSIGNED-PAYLOAD",
            method, path, canonical_query, canonical_headers, signed_headers
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let date_key = hmac_sha256(
            format!("AWS4{}", self.config.secret_access_key).as_bytes(),
            datestamp.as_bytes(),
        )?;
        let region_key = hmac_sha256(&date_key, self.config.region.as_bytes())?;
        let service_key = hmac_sha256(&region_key, b"s3")?;
        let signing_key = hmac_sha256(&service_key, b"aws4_request")?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "{}://{}{}?{}&X-Amz-Signature={}",
            scheme, host, path, canonical_query, signature
        ))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_secs: u64,
    ) -> Result<String, StorageError> {
        self.presign_at(key, content_type, expires_secs, Utc::now())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> =
                vec![("list-type", "2"), ("prefix", prefix)];
            if let Some(token) = continuation.as_deref() {
                query.push(("continuation-token", token));
            }

            let url = self.presign(
                "GET",
                None,
                &query,
                None,
                INTERNAL_URL_TTL_SECS,
                Utc::now(),
            )?;
            let response = self
                .http_client
                .get(&url)
                .send()
                .await
                .map_err(|e| StorageError::Request(e.to_string()))?;
            if !response.status().is_success() {
                return Err(StorageError::Request(format!(
                    "list returned {}",
                    response.status()
                )));
            }
            let body = response
                .text()
                .await
                .map_err(|e| StorageError::Request(e.to_string()))?;

            objects.extend(parse_listing(&body)?);

            continuation = xml_tag(&body, "NextContinuationToken").map(xml_unescape);
            if continuation.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let url = self.presign(
            "DELETE",
            Some(key),
            &[],
            None,
            INTERNAL_URL_TTL_SECS,
            Utc::now(),
        )?;
        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        // A missing object counts as deleted
        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            Err(StorageError::Request(format!(
                "delete returned {}",
                response.status()
            )))
        }
    }
}

fn parse_listing(body: &str) -> Result<Vec<StoredObject>, StorageError> {
    let mut objects = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("<Contents>") {
        let after = &rest[start + "<Contents>".len()..];
        let end = after
            .find("</Contents>")
            .ok_or_else(|| StorageError::Request("unterminated listing entry".to_string()))?;
        let block = &after[..end];

        let key = xml_tag(block, "Key")
            .map(xml_unescape)
            .ok_or_else(|| StorageError::Request("listing entry without key".to_string()))?;
        let last_modified = xml_tag(block, "LastModified")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                StorageError::Request("listing entry without valid timestamp".to_string())
            })?;

        objects.push(StoredObject { key, last_modified });
        rest = &after[end + "</Contents>".len()..];
    }
    Ok(objects)
}

fn xml_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

fn xml_unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Percent-encodes per the SigV4 rules: unreserved characters pass through,
/// everything else becomes uppercase `%XX`. Slashes survive in object paths
/// but are encoded inside query values.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_store() -> S3ObjectStore {
        S3ObjectStore::new(StorageConfig {
            bucket: "workbench-data".to_string(),
            region: "us-east-1".to_string(),
            endpoint: "https://s3.amazonaws.com".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            upload_url_ttl_secs: 600,
            sweep_interval_secs: 3600,
            sweep_grace_secs: 86400,
        })
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_presigned_url_shape() {
        let url = test_store()
            .presign_at("u1/7/abc-data.csv", "text/csv", 600, fixed_now())
            .expect("presign should succeed");

        assert!(url.starts_with("https://s3.amazonaws.com/workbench-data/u1/7/abc-data.csv?"));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Expires=600"));
        assert!(url.contains("X-Amz-Date=20260815T120000Z"));
        assert!(url.contains("X-Amz-SignedHeaders=content-type%3Bhost"));

        let signature = url
            .rsplit_once("X-Amz-Signature=")
            .map(|(_, sig)| sig)
            .expect("signature param present");
        assert_eq!(signature.len(), 64);
        assert!(signature.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_presign_is_deterministic_for_fixed_time() {
        let store = test_store();
        let a = store
            .presign_at("k", "text/csv", 600, fixed_now())
            .expect("presign should succeed");
        let b = store
            .presign_at("k", "text/csv", 600, fixed_now())
            .expect("presign should succeed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_special_characters_are_encoded() {
        let url = test_store()
            .presign_at("u1/7/tok-my data (v2).csv", "text/csv", 600, fixed_now())
            .expect("presign should succeed");
        assert!(url.contains("my%20data%20%28v2%29.csv"));
    }

    #[test]
    fn test_list_url_signs_query_in_order() {
        let url = test_store()
            .presign(
                "GET",
                None,
                &[("list-type", "2"), ("prefix", "u1/")],
                None,
                60,
                fixed_now(),
            )
            .expect("presign should succeed");

        assert!(url.starts_with("https://s3.amazonaws.com/workbench-data?"));
        assert!(url.contains("X-Amz-SignedHeaders=host"));
        // X-Amz-* parameters sort before the lowercase listing parameters
        let amz = url.find("X-Amz-Algorithm").expect("algorithm param");
        let list_type = url.find("list-type=2").expect("list-type param");
        let prefix = url.find("prefix=u1%2F").expect("prefix param");
        assert!(amz < list_type && list_type < prefix);
    }

    #[test]
    fn test_missing_credentials_fail_cleanly() {
        let store = S3ObjectStore::new(StorageConfig {
            bucket: "b".to_string(),
            region: "us-east-1".to_string(),
            endpoint: "https://s3.amazonaws.com".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            upload_url_ttl_secs: 600,
            sweep_interval_secs: 3600,
            sweep_grace_secs: 86400,
        });
        let err = store
            .presign_at("k", "text/csv", 600, fixed_now())
            .expect_err("presign should fail");
        assert!(matches!(err, StorageError::NotConfigured(_)));
    }

    #[test]
    fn test_bad_endpoint_is_rejected() {
        let store = S3ObjectStore::new(StorageConfig {
            bucket: "b".to_string(),
            region: "us-east-1".to_string(),
            endpoint: "s3.amazonaws.com".to_string(),
            access_key_id: "k".to_string(),
            secret_access_key: "s".to_string(),
            upload_url_ttl_secs: 600,
            sweep_interval_secs: 3600,
            sweep_grace_secs: 86400,
        });
        let err = store
            .presign_at("k", "text/csv", 600, fixed_now())
            .expect_err("presign should fail");
        assert!(matches!(err, StorageError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_listing_parse() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Name>workbench-data</Name>
  <Contents>
    <Key>u1/7/abc-data.csv</Key>
    <LastModified>2026-08-15T11:00:00.000Z</LastModified>
    <Size>42</Size>
  </Contents>
  <Contents>
    <Key>u1/7/def-a&amp;b.csv</Key>
    <LastModified>2026-08-15T11:30:00.000Z</LastModified>
    <Size>7</Size>
  </Contents>
</ListBucketResult>"#;

        let objects = parse_listing(body).expect("parse listing");
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].key, "u1/7/abc-data.csv");
        assert_eq!(objects[1].key, "u1/7/def-a&b.csv");
        assert_eq!(
            objects[1].last_modified,
            Utc.with_ymd_and_hms(2026, 8, 15, 11, 30, 0)
                .single()
                .expect("valid timestamp")
        );
    }

    #[test]
    fn test_listing_parse_rejects_entry_without_key() {
        let body = "<Contents><LastModified>2026-08-15T11:00:00Z</LastModified></Contents>";
        assert!(parse_listing(body).is_err());
    }
}
