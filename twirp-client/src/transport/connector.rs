//! TLS connector setup for the hyper transport.
//!
//! # Feature Flags
//!
//! TLS support requires both a crypto provider and root certificates:
//!
//! - **Crypto providers** (choose one):
//!   - `tls-ring` - Use ring crypto (default with `tls` feature)
//!   - `tls-aws-lc` - Use AWS LC crypto
//!
//! - **Root certificates** (choose one):
//!   - `tls-native-roots` - Use system root certificates (default with `tls` feature)
//!   - `tls-webpki-roots` - Use bundled Mozilla root certificates
//!
//! Without these features a [`ClientConfig`] must be supplied explicitly
//! (and a global crypto provider installed).

use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::ClientConfig;

/// Check if TLS features are properly configured.
///
/// Returns true if both a crypto provider AND root certificates are available.
#[inline]
pub const fn has_tls_support() -> bool {
    cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
        && cfg!(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))
}

/// Try to get a crypto provider ConfigBuilder.
///
/// Priority:
/// 1. Feature-gated provider (tls-ring or tls-aws-lc)
/// 2. User-installed global default provider
fn crypto_provider_builder() -> Option<rustls::ConfigBuilder<ClientConfig, rustls::WantsVerifier>>
{
    #[cfg(feature = "tls-ring")]
    let provider = Some(Arc::new(rustls::crypto::ring::default_provider()));

    #[cfg(all(feature = "tls-aws-lc", not(feature = "tls-ring")))]
    let provider = Some(Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    #[cfg(not(any(feature = "tls-ring", feature = "tls-aws-lc")))]
    let provider = rustls::crypto::CryptoProvider::get_default().cloned();

    ClientConfig::builder_with_provider(provider?)
        .with_safe_default_protocol_versions()
        .ok()
}

/// Build the default TLS configuration.
///
/// Uses feature-gated root certificates (native or webpki) and either a
/// feature-gated crypto provider or a user-installed global default.
///
/// Returns `None` if no crypto provider or no root certificate source is
/// available.
pub fn default_tls_config() -> Option<ClientConfig> {
    #[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
    {
        let builder = crypto_provider_builder()?;
        Some(
            builder
                .with_root_certificates(build_root_store())
                .with_no_client_auth(),
        )
    }

    #[cfg(not(any(feature = "tls-native-roots", feature = "tls-webpki-roots")))]
    {
        None
    }
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn build_root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();

    // Prefer native over webpki if both enabled
    #[cfg(feature = "tls-native-roots")]
    {
        let native_certs = rustls_native_certs::load_native_certs();
        if !native_certs.errors.is_empty() {
            // Some certs may still have loaded
            #[cfg(feature = "tracing")]
            tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
        }
        roots.add_parsable_certificates(native_certs.certs);
    }

    #[cfg(all(feature = "tls-webpki-roots", not(feature = "tls-native-roots")))]
    {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    roots
}

/// Build a connector that speaks both `http://` and `https://`.
pub fn build_https_connector(config: ClientConfig) -> HttpsConnector<HttpConnector> {
    HttpsConnectorBuilder::new()
        .with_tls_config(config)
        .https_or_http()
        .enable_all_versions()
        .build()
}

/// A certificate verifier that accepts any certificate.
///
/// # Warning
///
/// Only for development/testing. It makes the connection vulnerable to
/// man-in-the-middle attacks.
#[derive(Debug)]
pub struct DangerousAcceptAnyCertVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousAcceptAnyCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}

/// Create a TLS config that accepts any certificate (development only).
///
/// Returns `None` if no crypto provider is available.
pub fn danger_accept_invalid_certs_config() -> Option<ClientConfig> {
    Some(
        crypto_provider_builder()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousAcceptAnyCertVerifier))
            .with_no_client_auth(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(
        any(feature = "tls-ring", feature = "tls-aws-lc"),
        any(feature = "tls-native-roots", feature = "tls-webpki-roots")
    ))]
    #[test]
    fn test_default_tls_config() {
        assert!(has_tls_support());
        let config = default_tls_config().expect("should build with features enabled");
        assert!(config.alpn_protocols.is_empty());
        let _ = build_https_connector(config);
    }

    #[cfg(any(feature = "tls-ring", feature = "tls-aws-lc"))]
    #[test]
    fn test_danger_accept_invalid_certs_config() {
        assert!(danger_accept_invalid_certs_config().is_some());
    }
}
