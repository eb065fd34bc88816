//! WebSocket を使った FeedConnector 実装
//!
//! ## 責務
//!
//! - ステータスフィードへの WebSocket 接続
//! - 受信メッセージを `FeedFrame` に変換（Binary は UTF-8 としてデコード）
//!
//! ## 設計ノート
//!
//! 送信は行わないため、返すのは読み取り側のストリームのみです。
//! Ping への応答は tungstenite が読み取り時に処理します。
//! ストリームを drop すると接続も閉じられます。

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::domain::{FeedConnector, FeedFrame, FeedStream, TransportError};

/// WebSocket を使った FeedConnector 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketFeedConnector;

impl WebSocketFeedConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FeedConnector for WebSocketFeedConnector {
    async fn connect(&self, url: &str) -> Result<FeedStream, TransportError> {
        let (ws_stream, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        tracing::debug!("WebSocket handshake completed: HTTP {}", response.status());

        let frames = ws_stream.filter_map(|message| async move { to_feed_frame(message) });
        Ok(frames.boxed())
    }
}

/// 受信メッセージを `FeedFrame` に変換する
///
/// Ping / Pong など表示に関係しない制御フレームは `None`
fn to_feed_frame(
    message: Result<Message, tungstenite::Error>,
) -> Option<Result<FeedFrame, TransportError>> {
    match message {
        Ok(Message::Text(text)) => Some(Ok(FeedFrame::Text(text.as_str().to_owned()))),
        Ok(Message::Binary(data)) => Some(
            String::from_utf8(data.to_vec())
                .map(FeedFrame::Text)
                .map_err(|_| TransportError::InvalidUtf8),
        ),
        Ok(Message::Close(frame)) => {
            let reason = match frame {
                Some(frame) if !frame.reason.is_empty() => {
                    format!("{} ({})", frame.reason.as_str(), u16::from(frame.code))
                }
                Some(frame) => format!("close code {}", u16::from(frame.code)),
                None => "closed by server".to_string(),
            };
            Some(Ok(FeedFrame::Closed { reason }))
        }
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => None,
        Err(e) => Some(Err(TransportError::Read(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::protocol::{CloseFrame, frame::coding::CloseCode};

    #[test]
    fn test_text_message_becomes_text_frame() {
        // テスト項目: Text メッセージがそのままテキストフレームになる
        // given (前提条件):
        let message = Message::text(r#"{"type":"full"}"#);

        // when (操作):
        let result = to_feed_frame(Ok(message));

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Ok(FeedFrame::Text(r#"{"type":"full"}"#.to_string())))
        );
    }

    #[test]
    fn test_binary_message_is_decoded_as_utf8() {
        // テスト項目: Binary メッセージは UTF-8 としてデコードされる
        // given (前提条件):
        let message = Message::binary(br#"{"type":"server_update"}"#.to_vec());

        // when (操作):
        let result = to_feed_frame(Ok(message));

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Ok(FeedFrame::Text(r#"{"type":"server_update"}"#.to_string())))
        );
    }

    #[test]
    fn test_invalid_utf8_binary_is_an_error() {
        // テスト項目: UTF-8 として不正な Binary メッセージはエラーになる
        // given (前提条件):
        let message = Message::binary(vec![0xff, 0xfe, 0xfd]);

        // when (操作):
        let result = to_feed_frame(Ok(message));

        // then (期待する結果):
        assert_eq!(result, Some(Err(TransportError::InvalidUtf8)));
    }

    #[test]
    fn test_close_message_carries_reason() {
        // テスト項目: Close メッセージは理由付きのクローズになる
        // given (前提条件):
        let message = Message::Close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "restarting".into(),
        }));

        // when (操作):
        let result = to_feed_frame(Ok(message));

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Ok(FeedFrame::Closed {
                reason: "restarting (1001)".to_string()
            }))
        );
    }

    #[test]
    fn test_ping_is_skipped() {
        // テスト項目: Ping は表示に関係しないため無視される
        // given (前提条件):
        let message = Message::Ping(vec![1, 2, 3].into());

        // when (操作):
        let result = to_feed_frame(Ok(message));

        // then (期待する結果):
        assert!(result.is_none());
    }
}
