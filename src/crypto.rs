use aes_gcm::{
	aead::{generic_array::typenum::U16, Aead, KeyInit},
	aes::Aes256,
	AesGcm, Nonce,
};
use argon2::{
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

// AES-256-GCM with a 16-byte nonce, stored as `hex(iv):hex(ciphertext)`
type SsnCipher = AesGcm<Aes256, U16>;

type HmacSha256 = Hmac<Sha256>;

const IV_LEN: usize = 16;
const TOKEN_PAYLOAD_LEN: usize = 32;

/// Hash a password using Argon2id with a per-password random salt
pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);

	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| Error::internal(format!("hashing password: {}", e)))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, password_hash: &str) -> bool {
	let parsed = match PasswordHash::new(password_hash) {
		Ok(v) => v,
		Err(_) => return false,
	};

	Argon2::default()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}

fn ssn_cipher(secret: &str) -> Result<SsnCipher> {
	// The raw secret is hashed down to a fixed 32-byte key
	let key = Sha256::digest(secret.as_bytes());
	SsnCipher::new_from_slice(&key)
		.map_err(|_| Error::internal("deriving SSN encryption key"))
}

/// Encrypt an SSN for storage
///
/// A fresh random IV is generated per call, so encrypting the same SSN
/// twice yields different ciphertexts.
pub fn encrypt_ssn(ssn: &str, secret: &str) -> Result<String> {
	let cipher = ssn_cipher(secret)?;

	let mut iv = [0u8; IV_LEN];
	OsRng.fill_bytes(&mut iv);

	let ciphertext = cipher
		.encrypt(Nonce::<U16>::from_slice(&iv), ssn.as_bytes())
		.map_err(|_| Error::internal("encrypting SSN"))?;

	Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
}

/// Decrypt an SSN stored in the `iv:ciphertext` format
pub fn decrypt_ssn(stored: &str, secret: &str) -> Result<String> {
	let (iv_hex, ct_hex) = match stored.find(':') {
		Some(i) => (&stored[..i], &stored[i + 1..]),
		None => return Err(Error::internal("malformed encrypted SSN")),
	};

	let iv = hex::decode(iv_hex).map_err(|_| Error::internal("malformed encrypted SSN"))?;
	if iv.len() != IV_LEN {
		return Err(Error::internal("malformed encrypted SSN"));
	}
	let ciphertext = hex::decode(ct_hex).map_err(|_| Error::internal("malformed encrypted SSN"))?;

	let cipher = ssn_cipher(secret)?;
	let plain = cipher
		.decrypt(Nonce::<U16>::from_slice(&iv), ciphertext.as_ref())
		.map_err(|_| Error::internal("decrypting SSN"))?;

	String::from_utf8(plain).map_err(|_| Error::internal("decrypting SSN"))
}

fn sign(payload: &str, secret: &str) -> Result<String> {
	let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
		.map_err(|_| Error::internal("deriving token signing key"))?;
	mac.update(payload.as_bytes());

	Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Issue an opaque signed session token: `<payload-hex>.<signature-hex>`
pub fn issue_token(secret: &str) -> Result<String> {
	let mut payload = [0u8; TOKEN_PAYLOAD_LEN];
	OsRng.fill_bytes(&mut payload);

	let payload = hex::encode(payload);
	let signature = sign(&payload, secret)?;

	Ok(format!("{}.{}", payload, signature))
}

/// Check a token's signature
///
/// Comparison runs through the MAC's constant-time verifier; any malformed
/// token is simply invalid.
pub fn verify_token(token: &str, secret: &str) -> bool {
	let (payload, signature_hex) = match token.find('.') {
		Some(i) => (&token[..i], &token[i + 1..]),
		None => return false,
	};

	let signature = match hex::decode(signature_hex) {
		Ok(v) => v,
		Err(_) => return false,
	};

	let mut mac = match <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()) {
		Ok(v) => v,
		Err(_) => return false,
	};
	mac.update(payload.as_bytes());

	mac.verify_slice(&signature).is_ok()
}
