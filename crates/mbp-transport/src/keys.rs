//! Ключевые пары для конфигурации внешнего слоя обфускации
//!
//! Сам шифр — забота внешнего слоя: здесь ключи только генерируются,
//! переводятся в hex для конфигурационных файлов и читаются обратно.

use rand_core::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::{Result, TransportError};

/// Размер ключа X25519 (32 байта)
pub const KEY_SIZE: usize = 32;

/// Пара ключей X25519
///
/// Секретная половина зануляется при удалении самим `StaticSecret`;
/// промежуточные буферы декодирования зануляются вручную.
#[derive(Clone)]
pub struct TransportKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl TransportKeypair {
    /// Сгенерировать новую пару ключей
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = StaticSecret::random_from_rng(rng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Восстановить пару из hex-представления секретного ключа
    pub fn from_private_hex(encoded: &str) -> Result<Self> {
        let mut bytes = decode_key_hex(encoded)?;
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        bytes.zeroize();

        Ok(Self { secret, public })
    }

    /// Публичная половина пары
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Секретный ключ в hex для конфигурационного файла
    pub fn private_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }

    /// Публичный ключ в hex для конфигурационного файла
    pub fn public_hex(&self) -> String {
        hex::encode(self.public.as_bytes())
    }

    /// Обмен Диффи-Хеллмана с чужим публичным ключом
    ///
    /// Используется для проверки согласованности пары конфигураций;
    /// деривация сессионных ключей остаётся за внешним слоем.
    pub fn diffie_hellman(&self, their_public: &PublicKey) -> [u8; KEY_SIZE] {
        self.secret.diffie_hellman(their_public).to_bytes()
    }
}

/// Прочитать публичный ключ из hex-строки
pub fn public_key_from_hex(encoded: &str) -> Result<PublicKey> {
    let bytes = decode_key_hex(encoded)?;
    Ok(PublicKey::from(bytes))
}

fn decode_key_hex(encoded: &str) -> Result<[u8; KEY_SIZE]> {
    let mut decoded = hex::decode(encoded).map_err(|_| TransportError::InvalidKeyEncoding)?;

    if decoded.len() != KEY_SIZE {
        let actual = decoded.len();
        decoded.zeroize();
        return Err(TransportError::InvalidKeySize {
            expected: KEY_SIZE,
            actual,
        });
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&decoded);
    decoded.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_hex_round_trip() {
        let mut rng = OsRng;
        let keypair = TransportKeypair::generate(&mut rng);

        let restored = TransportKeypair::from_private_hex(&keypair.private_hex()).unwrap();
        assert_eq!(restored.public_hex(), keypair.public_hex());
    }

    #[test]
    fn test_public_key_from_hex() {
        let mut rng = OsRng;
        let keypair = TransportKeypair::generate(&mut rng);

        let parsed = public_key_from_hex(&keypair.public_hex()).unwrap();
        assert_eq!(parsed.as_bytes(), keypair.public_key().as_bytes());
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            TransportKeypair::from_private_hex("не hex"),
            Err(TransportError::InvalidKeyEncoding)
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            public_key_from_hex("deadbeef"),
            Err(TransportError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: 4,
            })
        ));
    }

    #[test]
    fn test_diffie_hellman_agreement() {
        let mut rng = OsRng;
        let ours = TransportKeypair::generate(&mut rng);
        let theirs = TransportKeypair::generate(&mut rng);

        let shared_a = ours.diffie_hellman(theirs.public_key());
        let shared_b = theirs.diffie_hellman(ours.public_key());
        assert_eq!(shared_a, shared_b);
    }
}
