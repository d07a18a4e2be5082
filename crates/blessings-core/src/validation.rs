//! Chain validation: signature verification and structural checks.
//!
//! Caveat evaluation and root recognition need a call context and a
//! principal's trust table; they live in the crates that own those.

use crate::certificate::{Certificate, Chain};
use crate::error::{Error, Result};
use crate::name::validate_name;

/// Validate a chain's structure (without checking signatures).
///
/// This performs:
/// - Length check against `max_length`
/// - Name grammar check on every extension
pub fn validate_chain_structure(chain: &Chain, max_length: usize) -> Result<()> {
    if chain.len() > max_length {
        return Err(Error::MalformedChain(format!(
            "chain has {} certificates, maximum is {}",
            chain.len(),
            max_length
        )));
    }

    for cert in chain.certificates() {
        validate_name(&cert.extension)?;
    }

    Ok(())
}

/// Verify every signature in a chain.
///
/// The first certificate must be signed by its own subject key; every later
/// certificate by the subject key of the one before it.
pub fn verify_chain_signatures(chain: &Chain) -> Result<()> {
    let mut parent: Option<&Certificate> = None;
    for cert in chain.certificates() {
        let signer_key = match parent {
            Some(prev) => &prev.subject_key,
            None => &cert.subject_key,
        };
        cert.verify(signer_key, parent)?;
        parent = Some(cert);
    }
    Ok(())
}

/// Structural checks followed by signature verification.
pub fn validate_chain(chain: &Chain, max_length: usize) -> Result<()> {
    validate_chain_structure(chain, max_length)?;
    verify_chain_signatures(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caveat::Caveat;
    use crate::certificate::CertificateBuilder;
    use crate::crypto::Keypair;

    fn make_chain(alice: &Keypair, bob: &Keypair) -> Chain {
        let root = Chain::root(CertificateBuilder::new("alice", alice.public_key()).sign(alice, None));
        let cert = CertificateBuilder::new("friend", bob.public_key())
            .caveat(Caveat::unconstrained())
            .sign(alice, Some(root.last()));
        root.extend(cert)
    }

    #[test]
    fn test_valid_chain() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        assert!(validate_chain(&make_chain(&alice, &bob), 16).is_ok());
    }

    #[test]
    fn test_root_not_self_signed() {
        let alice = Keypair::from_seed(&[1; 32]);
        let mallory = Keypair::from_seed(&[9; 32]);
        // Mallory claims a root certificate for alice's key.
        let chain = Chain::root(CertificateBuilder::new("alice", alice.public_key()).sign(&mallory, None));
        assert_eq!(verify_chain_signatures(&chain), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_tampered_extension() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let chain = make_chain(&alice, &bob);

        let mut certs: Vec<Certificate> = chain.certificates().to_vec();
        certs[1].extension = "boss".into();
        let tampered = Chain::new(certs).unwrap();
        assert_eq!(verify_chain_signatures(&tampered), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_stripped_caveat() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let chain = make_chain(&alice, &bob);

        let mut certs: Vec<Certificate> = chain.certificates().to_vec();
        certs[1].caveats.clear();
        let tampered = Chain::new(certs).unwrap();
        assert_eq!(verify_chain_signatures(&tampered), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_signed_by_wrong_parent() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let carol = Keypair::from_seed(&[3; 32]);
        let root = Chain::root(CertificateBuilder::new("alice", alice.public_key()).sign(&alice, None));
        // Bob signs an extension of a chain that was never granted to him.
        let cert = CertificateBuilder::new("friend", carol.public_key()).sign(&bob, Some(root.last()));
        assert_eq!(
            verify_chain_signatures(&root.extend(cert)),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn test_too_long() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        assert!(matches!(
            validate_chain_structure(&make_chain(&alice, &bob), 1),
            Err(Error::MalformedChain(_))
        ));
    }

    #[test]
    fn test_bad_extension_grammar() {
        let alice = Keypair::from_seed(&[1; 32]);
        let chain = Chain::root(CertificateBuilder::new("al/../ice", alice.public_key()).sign(&alice, None));
        assert!(matches!(
            validate_chain_structure(&chain, 16),
            Err(Error::InvalidName { .. })
        ));
    }
}
