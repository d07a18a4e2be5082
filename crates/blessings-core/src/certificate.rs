//! Certificates and chains.
//!
//! A certificate is one signed link of delegation: it names an extension,
//! carries caveats, and binds them to a subject key. A chain is an ordered,
//! non-empty list of certificates whose first element is self-signed and
//! whose every later element is signed by the previous subject.

use serde::{Deserialize, Serialize};

use crate::caveat::Caveat;
use crate::canonical::{certificate_content_bytes, chain_bytes, signed_message};
use crate::crypto::{Blake3Hash, PublicKey, Signature, Signer};
use crate::error::{Error, Result};
use crate::name::CHAIN_SEPARATOR;
use crate::types::ChainId;

/// A signed link in a delegation chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Certificate {
    /// Name fragment appended by this certificate.
    pub extension: String,

    /// Conditions that must hold for this certificate to be usable.
    pub caveats: Vec<Caveat>,

    /// The key being blessed.
    pub subject_key: PublicKey,

    /// Signature by the previous subject (or by `subject_key` for a root).
    pub signature: Signature,
}

impl Certificate {
    /// The message the signature covers, given the certificate it extends.
    pub fn signed_message(&self, parent: Option<&Certificate>) -> Vec<u8> {
        let parent_digest = parent.map(|p| p.signature.digest());
        let content = certificate_content_bytes(
            &self.extension,
            &self.caveats,
            &self.subject_key,
            parent_digest.as_ref(),
        );
        signed_message(&content)
    }

    /// Verify this certificate's signature against `signer_key`.
    pub fn verify(&self, signer_key: &PublicKey, parent: Option<&Certificate>) -> Result<()> {
        signer_key.verify(&self.signed_message(parent), &self.signature)
    }
}

/// Builder for certificates.
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    extension: String,
    caveats: Vec<Caveat>,
    subject_key: PublicKey,
}

impl CertificateBuilder {
    /// Start a certificate naming `extension` for `subject_key`.
    pub fn new(extension: impl Into<String>, subject_key: PublicKey) -> Self {
        Self {
            extension: extension.into(),
            caveats: Vec::new(),
            subject_key,
        }
    }

    /// Add a caveat.
    pub fn caveat(mut self, caveat: Caveat) -> Self {
        self.caveats.push(caveat);
        self
    }

    /// Add several caveats, preserving order.
    pub fn caveats(mut self, caveats: impl IntoIterator<Item = Caveat>) -> Self {
        self.caveats.extend(caveats);
        self
    }

    /// Sign the certificate.
    ///
    /// `parent` is the certificate being extended; `None` produces a root
    /// certificate, which is only valid if `signer` owns `subject_key`.
    pub fn sign(self, signer: &(impl Signer + ?Sized), parent: Option<&Certificate>) -> Certificate {
        let parent_digest: Option<Blake3Hash> = parent.map(|p| p.signature.digest());
        let content = certificate_content_bytes(
            &self.extension,
            &self.caveats,
            &self.subject_key,
            parent_digest.as_ref(),
        );
        let signature = signer.sign(&signed_message(&content));

        Certificate {
            extension: self.extension,
            caveats: self.caveats,
            subject_key: self.subject_key,
            signature,
        }
    }
}

/// A non-empty ordered list of certificates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Certificate>", into = "Vec<Certificate>")]
pub struct Chain {
    certificates: Vec<Certificate>,
}

impl Chain {
    /// Create a chain from certificates.
    ///
    /// Only checks non-emptiness; signatures are checked by
    /// [`crate::validation::verify_chain_signatures`].
    pub fn new(certificates: Vec<Certificate>) -> Result<Self> {
        if certificates.is_empty() {
            return Err(Error::MalformedChain("chain has no certificates".into()));
        }
        Ok(Self { certificates })
    }

    /// A chain holding a single root certificate.
    pub fn root(certificate: Certificate) -> Self {
        Self {
            certificates: vec![certificate],
        }
    }

    /// The certificates, root first.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Number of certificates.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false; chains are non-empty.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// The root (self-signed) certificate.
    pub fn first(&self) -> &Certificate {
        &self.certificates[0]
    }

    /// The last certificate.
    pub fn last(&self) -> &Certificate {
        &self.certificates[self.certificates.len() - 1]
    }

    /// The key that issued the chain.
    pub fn root_key(&self) -> &PublicKey {
        &self.first().subject_key
    }

    /// The key the chain was granted to.
    pub fn terminal_key(&self) -> &PublicKey {
        &self.last().subject_key
    }

    /// The blessing name: all extensions joined with `/`.
    pub fn name(&self) -> String {
        let mut name = String::new();
        for (i, cert) in self.certificates.iter().enumerate() {
            if i > 0 {
                name.push(CHAIN_SEPARATOR);
            }
            name.push_str(&cert.extension);
        }
        name
    }

    /// Content address of the chain.
    pub fn id(&self) -> ChainId {
        ChainId(Blake3Hash::hash(&chain_bytes(self)).0)
    }

    /// A new chain with `certificate` appended.
    pub fn extend(&self, certificate: Certificate) -> Self {
        let mut certificates = Vec::with_capacity(self.certificates.len() + 1);
        certificates.extend_from_slice(&self.certificates);
        certificates.push(certificate);
        Self { certificates }
    }
}

impl TryFrom<Vec<Certificate>> for Chain {
    type Error = Error;

    fn try_from(certificates: Vec<Certificate>) -> Result<Self> {
        Self::new(certificates)
    }
}

impl From<Chain> for Vec<Certificate> {
    fn from(chain: Chain) -> Self {
        chain.certificates
    }
}
