//! フィード接続の実装
//!
//! ## 概要
//!
//! このモジュールは `FeedConnector` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `websocket`: tokio-tungstenite を使った実装

pub mod websocket;

pub use websocket::WebSocketFeedConnector;
