//! Потоковое сопоставление грамматики с байтами соединения
//!
//! Матчер читает из соединения ровно по одному байту, накапливает их во
//! внутреннем буфере и после каждого байта заново сопоставляет буфер с
//! грамматикой. Прочитанные байты необратимо потреблены: ни возврата, ни
//! подглядывания нет. Буфер сбрасывается только между шагами прослушивания,
//! никогда посреди шага.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::{MimicryError, Result};
use crate::text::{MatchOutcome, StructuredText};

/// Размер буфера прослушивания по умолчанию
pub const DEFAULT_MAX_LISTEN_BYTES: usize = 255;

/// Потоковый матчер одной сессии
///
/// Владеет накопительным буфером. Создаётся на сессию и умирает вместе с
/// ней; между соединениями не переиспользуется.
#[derive(Debug)]
pub struct StreamingMatcher {
    buffer: BytesMut,
}

impl StreamingMatcher {
    /// Создать матчер с пустым буфером
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_MAX_LISTEN_BYTES),
        }
    }

    /// Сбросить накопительный буфер
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Читать по байту, пока грамматика не разрешится или не кончится лимит
    ///
    /// Буфер, не являющийся корректным UTF-8, считается оборванным посреди
    /// многобайтового символа: это не провал, накопление продолжается.
    /// `Failed` и `Success` возвращаются немедленно; если после `max_bytes`
    /// прочитанных байт вердикта нет — `BufferTooLarge`.
    pub async fn listen<S>(
        &mut self,
        connection: &mut S,
        expected: &StructuredText,
        max_bytes: usize,
    ) -> Result<Option<String>>
    where
        S: AsyncRead + Unpin,
    {
        self.reset();

        let mut byte = [0u8; 1];
        while self.buffer.len() < max_bytes {
            connection.read_exact(&mut byte).await.map_err(read_error)?;
            self.buffer.extend_from_slice(&byte);

            let Ok(candidate) = std::str::from_utf8(&self.buffer) else {
                continue;
            };

            match expected.match_text(candidate) {
                MatchOutcome::Incomplete => continue,
                MatchOutcome::Failed => {
                    debug!(
                        "несовпадение грамматики после {} байт",
                        self.buffer.len()
                    );
                    return Err(MimicryError::GrammarMismatch);
                }
                MatchOutcome::Success(captured) => return Ok(captured),
            }
        }

        Err(MimicryError::BufferTooLarge { limit: max_bytes })
    }
}

impl Default for StreamingMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn read_error(err: std::io::Error) -> MimicryError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        MimicryError::ConnectionClosed
    } else {
        MimicryError::ReadFailed(err)
    }
}
