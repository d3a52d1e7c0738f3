//! Интерфейс внешнего слоя преобразования соединения
//!
//! После успешной мимикрии соединение передаётся внешнему слою обфускации
//! (обмен ключами, шифрование записей). Этот крейт не знает, как слой
//! устроен: он видит только узкий интерфейс «забрать соединение, вернуть
//! преобразованное».

use std::future::Future;
use std::io;

/// Преобразование соединения, применяемое после успешной мимикрии
///
/// Движок мимикрии не вызывает преобразование никогда; это делает конвейер,
/// и только когда сценарий завершился успехом. Провалившийся handshake
/// оставляет преобразование нетронутым, а соединение — на выброс.
pub trait ConnectionTransform<S> {
    /// Тип соединения после преобразования
    type Output;

    /// Применить преобразование, забрав соединение во владение
    fn apply(&self, connection: S) -> impl Future<Output = io::Result<Self::Output>> + Send;
}

/// Преобразование-пустышка: возвращает соединение как есть
///
/// Для тестов и для развёртываний, накладывающих собственный шифр поверх
/// уже установленного канала.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<S: Send> ConnectionTransform<S> for Passthrough {
    type Output = S;

    async fn apply(&self, connection: S) -> io::Result<S> {
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_passthrough_preserves_stream() {
        tokio_test::block_on(async {
            let (local, mut remote) = tokio::io::duplex(64);

            let mut transformed = Passthrough.apply(local).await.unwrap();

            remote.write_all(b"as is").await.unwrap();
            let mut buf = [0u8; 5];
            transformed.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"as is");
        });
    }
}
