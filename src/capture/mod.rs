//! 点击采集
//!
//! [`Document`] 是页面级事件目标，[`ClickCapture`] 在其上注册唯一的点击
//! 监听器，把每次点击整理成 [`ClickPayload`] 交给追踪客户端。

mod document;
mod listener;
mod payload;

pub use document::{ClickListener, Document, ElementSnapshot, ListenerId, PageContext, PointerEvent};
pub use listener::ClickCapture;
pub use payload::{ClickPayload, NO_CLASS, NO_ID};
