//! UI Components

use leptos::prelude::*;
use crate::api::{self, ChatMessage};

/// Message bubble component
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let class = format!("message message-{}", message.role);
    let role = match message.role.as_str() {
        "user" => "You",
        "assistant" => "Advisor",
        _ => "Error",
    };

    view! {
        <div class=class>
            <span class="role">{role}</span>
            <p class="content">{message.content.clone()}</p>
        </div>
    }
}

/// Where the advisory dialogue stands
#[component]
pub fn PhaseBadge(phase: ReadSignal<String>) -> impl IntoView {
    view! {
        <span class="phase">{move || api::phase_label(&phase.get())}</span>
    }
}
