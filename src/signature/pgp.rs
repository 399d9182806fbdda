//! The rPGP-backed [`Verifier`]/[`Signer`] implementation.
//!
//! The backend splits responsibilities: OpenPGP packet *framing* is done
//! locally on the raw tag bytes, so the exact hashed region of a v3 or v4
//! signature can be replayed into the streaming digest byte-for-byte;
//! keys, the public-key math and the serialization of fresh signature
//! packets are delegated to the `pgp` crate.
//!
//! Verification works on a digest that was fed incrementally while the
//! package streamed past. The validator appends the signature's hashed
//! trailer (taken verbatim from the original packet, so no
//! re-serialization can disagree with the signer), finalizes, and checks
//! the raw signature against the digest with the matched key.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use pgp::composed::{Deserializable, SignedPublicKey, SignedSecretKey};
use pgp::crypto::hash::HashAlgorithm;
use pgp::packet::{
    Packet, PacketParser, PacketTrait, Signature, SignatureConfig, SignatureType,
    SignatureVersionSpecific, Subpacket, SubpacketData,
};
use pgp::types::{KeyDetails, Password, PublicKeyTrait, SecretKeyTrait};

use super::{ParsedSignature, SignatureInfo, SignatureValidator, Signer, Verifier};
use crate::digest::{DigestAlgo, Hasher};
use crate::error::{Error, Result};

/// A [`Verifier`] over a set of known public keys.
///
/// With an empty key set it degrades to parse-only mode: signature
/// metadata is extracted and reported, digests are still enforced by the
/// pipeline, but no key lookup or cryptographic check happens.
#[derive(Debug, Clone, Default)]
pub struct PgpVerifier {
    keys: Vec<SignedPublicKey>,
}

impl PgpVerifier {
    /// A verifier that parses signatures without validating them.
    pub fn parse_only() -> Self {
        Self::default()
    }

    /// A verifier trusting the given keys.
    pub fn new(keys: Vec<SignedPublicKey>) -> Self {
        Self { keys }
    }

    /// Adds one ASCII-armored public key.
    pub fn add_armored_key(&mut self, armored: &str) -> Result<()> {
        let (key, _) = SignedPublicKey::from_armor_single(std::io::Cursor::new(armored))
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        self.keys.push(key);
        Ok(())
    }

    /// The keys this verifier trusts.
    pub fn keys(&self) -> &[SignedPublicKey] {
        &self.keys
    }
}

impl Verifier for PgpVerifier {
    fn parse_signature(&self, blob: &[u8]) -> Result<Option<ParsedSignature>> {
        let meta = PacketMeta::parse(blob)?;
        let hash = DigestAlgo::from_rpm_code(i32::from(meta.hash_code))
            .ok_or(Error::NoPgpSignature)?;

        let info = SignatureInfo {
            hash,
            creation_time: UNIX_EPOCH + Duration::from_secs(u64::from(meta.created)),
            key_id: meta.key_id,
            key_fingerprint: meta.fingerprint.clone(),
            signer: None,
            header_only: false,
        };

        let validator: Box<dyn SignatureValidator> = if self.keys.is_empty() {
            Box::new(ParseOnlyValidator)
        } else {
            // Only the key-checking path needs the full packet parse.
            let signature = parse_signature_packet(blob)?;
            Box::new(KeyValidator {
                keys: self.keys.clone(),
                signature,
                trailer: meta.hashed_trailer,
            })
        };

        Ok(Some(ParsedSignature { info, validator }))
    }
}

struct ParseOnlyValidator;

impl SignatureValidator for ParseOnlyValidator {
    fn validate(self: Box<Self>, _hasher: Hasher, _info: &mut SignatureInfo) -> Result<()> {
        Ok(())
    }
}

struct KeyValidator {
    keys: Vec<SignedPublicKey>,
    signature: Signature,
    trailer: Vec<u8>,
}

impl SignatureValidator for KeyValidator {
    fn validate(self: Box<Self>, mut hasher: Hasher, info: &mut SignatureInfo) -> Result<()> {
        hasher.update(&self.trailer);
        let digest = hasher.finalize();
        let hash_alg = pgp_hash(info.hash);
        let raw_sig = self.signature.signature().ok_or(Error::NoPgpSignature)?;

        for key in &self.keys {
            if key_matches(key, info) {
                key.verify_signature(hash_alg, &digest, raw_sig)
                    .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
                info.signer = Some(hex::encode(key.fingerprint().as_bytes()));
                return Ok(());
            }
            for subkey in &key.public_subkeys {
                if key_matches(subkey, info) {
                    subkey
                        .verify_signature(hash_alg, &digest, raw_sig)
                        .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
                    // The identity reported is the primary key's.
                    info.signer = Some(hex::encode(key.fingerprint().as_bytes()));
                    return Ok(());
                }
            }
        }

        Err(Error::KeyNotFound {
            key_id: info.key_id,
            fingerprint: info.key_fingerprint.clone(),
        })
    }
}

fn key_matches<K: KeyDetails>(key: &K, info: &SignatureInfo) -> bool {
    // Fingerprints are authoritative when the signature names one.
    if let Some(fp) = &info.key_fingerprint {
        return key.fingerprint().as_bytes() == fp.as_slice();
    }
    if let Some(id) = info.key_id {
        let key_id = key.key_id();
        let bytes: &[u8] = key_id.as_ref();
        if bytes.len() == 8 {
            return u64::from_be_bytes(bytes.try_into().unwrap()) == id;
        }
    }
    false
}

fn parse_signature_packet(blob: &[u8]) -> Result<Signature> {
    let mut parser = PacketParser::new(blob);
    let packet = parser
        .next()
        .ok_or(Error::NoPgpSignature)?
        .map_err(|_| Error::NoPgpSignature)?;
    if parser.next().is_some() {
        return Err(Error::TrailingGarbage);
    }
    match packet {
        Packet::Signature(signature) => Ok(signature),
        _ => Err(Error::NoPgpSignature),
    }
}

/// A [`Signer`] over one secret key.
pub struct PgpSigner {
    key: SignedSecretKey,
    password: Password,
}

impl std::fmt::Debug for PgpSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgpSigner").finish_non_exhaustive()
    }
}

impl PgpSigner {
    /// A signer over an unprotected key.
    pub fn new(key: SignedSecretKey) -> Self {
        Self {
            key,
            password: Password::empty(),
        }
    }

    /// A signer over a passphrase-protected key.
    pub fn with_password(key: SignedSecretKey, password: &str) -> Self {
        Self {
            key,
            password: Password::from(password),
        }
    }

    /// Loads an ASCII-armored secret key.
    pub fn from_armored(armored: &str) -> Result<Self> {
        let (key, _) = SignedSecretKey::from_armor_single(std::io::Cursor::new(armored))
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// The public half of the signing key, for verifying what was signed.
    pub fn public_key(&self) -> SignedPublicKey {
        self.key.signed_public_key()
    }
}

impl Signer for PgpSigner {
    fn sign(&self, mut hasher: Hasher, creation_time: SystemTime) -> Result<Vec<u8>> {
        let secs = creation_time
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let signing_key = &self.key.primary_key;
        let hash_alg = pgp_hash(hasher.algo());
        let pub_alg = signing_key.algorithm();
        let fingerprint = signing_key.fingerprint();
        let key_id = signing_key.key_id();

        // The hashed subpacket area, serialized exactly as rPGP will
        // serialize it when the packet is written below: one-octet
        // lengths, no critical bits, in the order given to the config.
        let fp_bytes = fingerprint.as_bytes().to_vec();
        let key_id_bytes: Vec<u8> = key_id.as_ref().to_vec();
        let mut hashed = Vec::new();
        hashed.extend_from_slice(&[0x05, 0x02]);
        hashed.extend_from_slice(&secs.to_be_bytes());
        hashed.push(2 + fp_bytes.len() as u8);
        hashed.push(0x21);
        hashed.push(0x04);
        hashed.extend_from_slice(&fp_bytes);
        hashed.push(1 + key_id_bytes.len() as u8);
        hashed.push(0x10);
        hashed.extend_from_slice(&key_id_bytes);

        // v4 signature trailer: the signed fields, then the length suffix.
        let mut trailer = vec![
            0x04,
            0x00, // binary document signature
            u8::from(pub_alg),
            u8::from(hash_alg),
        ];
        trailer.extend_from_slice(&(hashed.len() as u16).to_be_bytes());
        trailer.extend_from_slice(&hashed);
        let signed_len = trailer.len() as u32;
        trailer.push(0x04);
        trailer.push(0xFF);
        trailer.extend_from_slice(&signed_len.to_be_bytes());

        hasher.update(&trailer);
        let digest = hasher.finalize();

        let raw = signing_key
            .create_signature(&self.password, hash_alg, &digest)
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;

        let creation_time: DateTime<Utc> = DateTime::from_timestamp(i64::from(secs), 0)
            .ok_or_else(|| Error::SignatureInvalid("creation time out of range".into()))?;

        let config = SignatureConfig {
            typ: SignatureType::Binary,
            pub_alg,
            hash_alg,
            hashed_subpackets: vec![
                subpacket(SubpacketData::SignatureCreationTime(creation_time))?,
                subpacket(SubpacketData::IssuerFingerprint(fingerprint))?,
                subpacket(SubpacketData::Issuer(key_id))?,
            ],
            unhashed_subpackets: vec![],
            version_specific: SignatureVersionSpecific::V4,
        };
        let packet = Signature::from_config(config, [digest[0], digest[1]], raw)
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;

        let mut out = Vec::with_capacity(1024);
        packet
            .to_writer_with_header(&mut out)
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        Ok(out)
    }
}

fn subpacket(data: SubpacketData) -> Result<Subpacket> {
    Subpacket::regular(data).map_err(|e| Error::SignatureInvalid(e.to_string()))
}

fn pgp_hash(algo: DigestAlgo) -> HashAlgorithm {
    match algo {
        DigestAlgo::Md5 => HashAlgorithm::Md5,
        DigestAlgo::Sha1 => HashAlgorithm::Sha1,
        DigestAlgo::Sha224 => HashAlgorithm::Sha224,
        DigestAlgo::Sha256 => HashAlgorithm::Sha256,
        DigestAlgo::Sha384 => HashAlgorithm::Sha384,
        DigestAlgo::Sha512 => HashAlgorithm::Sha512,
    }
}

/// Signature packet fields extracted by local framing.
///
/// The hashed trailer is sliced out of the original bytes so the digest
/// replay cannot disagree with whatever the signer actually hashed.
#[derive(Debug, Clone)]
struct PacketMeta {
    hash_code: u8,
    created: u32,
    key_id: Option<u64>,
    fingerprint: Option<Vec<u8>>,
    hashed_trailer: Vec<u8>,
}

impl PacketMeta {
    fn parse(blob: &[u8]) -> Result<Self> {
        let (body, consumed) = packet_body(blob)?;
        if consumed != blob.len() {
            return Err(Error::TrailingGarbage);
        }
        match body.first() {
            Some(3) => Self::parse_v3(body),
            Some(4) => Self::parse_v4(body),
            _ => Err(Error::NoPgpSignature),
        }
    }

    /// v3 layout: version, hashed-length(5), type, time(4), keyid(8),
    /// pubalg, hashalg, left16, mpis.
    fn parse_v3(body: &[u8]) -> Result<Self> {
        if body.len() < 19 || body[1] != 5 {
            return Err(Error::NoPgpSignature);
        }
        Ok(Self {
            hash_code: body[16],
            created: u32::from_be_bytes(body[3..7].try_into().unwrap()),
            key_id: Some(u64::from_be_bytes(body[7..15].try_into().unwrap())),
            fingerprint: None,
            // v3 hashes just the type and creation time, with no suffix.
            hashed_trailer: body[2..7].to_vec(),
        })
    }

    /// v4 layout: version, type, pubalg, hashalg, hashed area, unhashed
    /// area, left16, mpis.
    fn parse_v4(body: &[u8]) -> Result<Self> {
        if body.len() < 6 {
            return Err(Error::NoPgpSignature);
        }
        let hashed_len = u16::from_be_bytes(body[4..6].try_into().unwrap()) as usize;
        let hashed_end = 6 + hashed_len;
        if body.len() < hashed_end + 2 {
            return Err(Error::NoPgpSignature);
        }
        let unhashed_len =
            u16::from_be_bytes(body[hashed_end..hashed_end + 2].try_into().unwrap()) as usize;
        let unhashed_end = hashed_end + 2 + unhashed_len;
        if body.len() < unhashed_end {
            return Err(Error::NoPgpSignature);
        }

        let mut meta = Self {
            hash_code: body[3],
            created: 0,
            key_id: None,
            fingerprint: None,
            hashed_trailer: Vec::new(),
        };
        walk_subpackets(&body[6..hashed_end], &mut meta)?;
        walk_subpackets(&body[hashed_end + 2..unhashed_end], &mut meta)?;

        let mut trailer = body[..hashed_end].to_vec();
        trailer.push(0x04);
        trailer.push(0xFF);
        trailer.extend_from_slice(&(hashed_end as u32).to_be_bytes());
        meta.hashed_trailer = trailer;
        Ok(meta)
    }
}

/// Splits the packet framing, returning the body and the total bytes the
/// packet occupies. Partial-length packets are not signatures and are
/// rejected.
fn packet_body(blob: &[u8]) -> Result<(&[u8], usize)> {
    let ctb = *blob.first().ok_or(Error::NoPgpSignature)?;
    if ctb & 0x80 == 0 {
        return Err(Error::NoPgpSignature);
    }

    let (tag, len, header_len) = if ctb & 0x40 != 0 {
        // New format.
        let tag = ctb & 0x3f;
        let first = *blob.get(1).ok_or(Error::NoPgpSignature)?;
        match first {
            0..=191 => (tag, first as usize, 2),
            192..=223 => {
                let second = *blob.get(2).ok_or(Error::NoPgpSignature)?;
                (tag, ((first as usize - 192) << 8) + second as usize + 192, 3)
            }
            255 => {
                let bytes = blob.get(2..6).ok_or(Error::NoPgpSignature)?;
                (tag, u32::from_be_bytes(bytes.try_into().unwrap()) as usize, 6)
            }
            _ => return Err(Error::NoPgpSignature),
        }
    } else {
        // Old format.
        let tag = (ctb >> 2) & 0x0f;
        match ctb & 0x03 {
            0 => {
                let len = *blob.get(1).ok_or(Error::NoPgpSignature)?;
                (tag, len as usize, 2)
            }
            1 => {
                let bytes = blob.get(1..3).ok_or(Error::NoPgpSignature)?;
                (tag, u16::from_be_bytes(bytes.try_into().unwrap()) as usize, 3)
            }
            2 => {
                let bytes = blob.get(1..5).ok_or(Error::NoPgpSignature)?;
                (tag, u32::from_be_bytes(bytes.try_into().unwrap()) as usize, 5)
            }
            _ => (tag, blob.len().saturating_sub(1), 1),
        }
    };

    if tag != 2 {
        return Err(Error::NoPgpSignature);
    }
    let body = blob
        .get(header_len..header_len + len)
        .ok_or(Error::NoPgpSignature)?;
    Ok((body, header_len + len))
}

fn walk_subpackets(mut area: &[u8], meta: &mut PacketMeta) -> Result<()> {
    while !area.is_empty() {
        let first = area[0];
        let (len, consumed) = match first {
            0..=191 => (first as usize, 1),
            192..=254 => {
                let second = *area.get(1).ok_or(Error::NoPgpSignature)?;
                (((first as usize - 192) << 8) + second as usize + 192, 2)
            }
            255 => {
                let bytes = area.get(1..5).ok_or(Error::NoPgpSignature)?;
                (u32::from_be_bytes(bytes.try_into().unwrap()) as usize, 5)
            }
        };
        let packet = area
            .get(consumed..consumed + len)
            .ok_or(Error::NoPgpSignature)?;
        if packet.is_empty() {
            return Err(Error::NoPgpSignature);
        }
        let sp_type = packet[0] & 0x7f;
        let data = &packet[1..];
        match sp_type {
            2 if data.len() >= 4 => {
                meta.created = u32::from_be_bytes(data[..4].try_into().unwrap());
            }
            16 if data.len() >= 8 => {
                meta.key_id = Some(u64::from_be_bytes(data[..8].try_into().unwrap()));
            }
            33 if data.len() > 1 => {
                // First octet is the key version; the fingerprint follows.
                meta.fingerprint = Some(data[1..].to_vec());
            }
            _ => {}
        }
        area = &area[consumed + len..];
    }
    Ok(())
}
