use serde::{Deserialize, Serialize};

use super::PointerEvent;
use crate::storage::NewClick;

/// 元素没有 id 时写入的值
pub const NO_ID: &str = "no-id";
/// 元素没有 class 时写入的值
pub const NO_CLASS: &str = "no-class";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPayload {
    pub element_id: String,
    pub element_class: String,
    pub element_text: String,
    pub page_url: String,
    pub x_position: i32,
    pub y_position: i32,
}

impl ClickPayload {
    pub fn from_event(event: &PointerEvent, page_url: &str) -> Self {
        let target = &event.target;

        let element_id = if target.id.is_empty() {
            NO_ID.to_string()
        } else {
            target.id.clone()
        };

        let joined = target.class_list.join(" ");
        let element_class = if joined.is_empty() {
            NO_CLASS.to_string()
        } else {
            joined
        };

        Self {
            element_id,
            element_class,
            element_text: target.text_content.clone().unwrap_or_default(),
            page_url: page_url.to_string(),
            x_position: event.client_x,
            y_position: event.client_y,
        }
    }

    pub fn into_new_click(self, visitor_id: String) -> NewClick {
        NewClick {
            visitor_id,
            element_id: self.element_id,
            element_class: self.element_class,
            element_text: self.element_text,
            page_url: self.page_url,
            x_position: self.x_position,
            y_position: self.y_position,
        }
    }
}
