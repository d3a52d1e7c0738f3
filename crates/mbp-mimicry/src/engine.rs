//! Движок tone-burst: исполнение сценария на живом соединении
//!
//! Движок проходит шаги сценария строго последовательно, оборачивая каждый
//! шаг (и «сказать», и «слушать») в тайм-аут. Первый же провал — несовпадение
//! грамматики, переполнение буфера, тайм-аут, ошибка I/O — прерывает прогон
//! без попыток восстановления; закрыть соединение обязан вызывающий.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{MimicryError, Result};
use crate::matcher::StreamingMatcher;
use crate::profiles;
use crate::script::{MimicProtocol, Role, ToneBurstScript, ToneBurstStep};
use crate::text::StructuredText;

/// Тайм-аут одного шага сценария по умолчанию
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Сессия tone-burst: один прогон сценария на одном соединении
///
/// Эфемерна: монопольно владеет соединением на время прогона, держит
/// накопительный буфер матчера и уничтожается по завершении. Между
/// соединениями не переиспользуется.
pub struct ToneBurstSession<'a, S> {
    connection: &'a mut S,
    matcher: StreamingMatcher,
}

impl<'a, S> ToneBurstSession<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(connection: &'a mut S) -> Self {
        Self {
            connection,
            matcher: StreamingMatcher::new(),
        }
    }

    async fn speak(&mut self, text: &StructuredText) -> Result<()> {
        let rendered = text.render()?;
        self.connection
            .write_all(rendered.as_bytes())
            .await
            .map_err(write_error)?;
        self.connection.flush().await.map_err(write_error)?;
        Ok(())
    }

    async fn listen(
        &mut self,
        expected: &StructuredText,
        max_bytes: usize,
    ) -> Result<Option<String>> {
        self.matcher
            .listen(&mut *self.connection, expected, max_bytes)
            .await
    }
}

/// Движок, связывающий сценарий с тайм-аутом шага
#[derive(Debug, Clone)]
pub struct ToneBurst {
    script: ToneBurstScript,
    step_timeout: Duration,
}

impl ToneBurst {
    /// Создать движок с тайм-аутом шага по умолчанию
    pub fn new(script: ToneBurstScript) -> Self {
        Self::with_step_timeout(script, DEFAULT_STEP_TIMEOUT)
    }

    /// Создать движок с явным тайм-аутом шага
    pub fn with_step_timeout(script: ToneBurstScript, step_timeout: Duration) -> Self {
        Self {
            script,
            step_timeout,
        }
    }

    /// Сценарий движка
    pub fn script(&self) -> &ToneBurstScript {
        &self.script
    }

    /// Тайм-аут одного шага
    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    /// Выполнить сценарий на соединении от начала до конца
    ///
    /// Сработавший таймер сбрасывает незавершённый ввод-вывод шага и
    /// оставляет соединение в пригодном для закрытия состоянии.
    pub async fn perform<S>(&self, connection: &mut S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut session = ToneBurstSession::new(connection);

        for (index, step) in self.script.steps().iter().enumerate() {
            match step {
                ToneBurstStep::Speak(text) => {
                    tokio::time::timeout(self.step_timeout, session.speak(text))
                        .await
                        .map_err(|_| self.timeout_error(index))??;
                    debug!("→ шаг {}: текст отправлен", index + 1);
                }
                ToneBurstStep::Listen {
                    expected,
                    max_bytes,
                } => {
                    let captured =
                        tokio::time::timeout(self.step_timeout, session.listen(expected, *max_bytes))
                            .await
                            .map_err(|_| self.timeout_error(index))??;
                    debug!("← шаг {}: совпадение получено, захват: {:?}", index + 1, captured);
                }
            }
        }

        Ok(())
    }

    fn timeout_error(&self, index: usize) -> MimicryError {
        MimicryError::StepTimeout {
            step: index + 1,
            timeout_ms: self.step_timeout.as_millis() as u64,
        }
    }
}

/// Выполнить handshake мимикрии для пары (протокол, роль)
///
/// Подбирает сценарий через таблицу профилей и прогоняет его на соединении.
/// По успеху управление возвращается вызывающему: применение следующего
/// слоя преобразований — его забота, движок соединение не трогает.
pub async fn perform_handshake<S>(
    protocol: MimicProtocol,
    role: Role,
    connection: &mut S,
    step_timeout: Duration,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let script = profiles::script_for(protocol, role)?;
    info!(
        "начало мимикрии: протокол {}, роль {}, шагов {}",
        protocol,
        role,
        script.len()
    );

    let engine = ToneBurst::with_step_timeout(script, step_timeout);
    match engine.perform(connection).await {
        Ok(()) => {
            info!("мимикрия завершена успешно");
            Ok(())
        }
        Err(err) => {
            warn!("мимикрия прервана: {}", err);
            Err(err)
        }
    }
}

fn write_error(err: std::io::Error) -> MimicryError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset => MimicryError::ConnectionClosed,
        _ => MimicryError::WriteFailed(err),
    }
}
