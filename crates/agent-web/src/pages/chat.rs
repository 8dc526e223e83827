//! Chat Page

use leptos::prelude::*;
use crate::api::{self, ChatMessage};
use crate::components::{MessageBubble, PhaseBadge};

/// Browser session-storage key holding the conversation id
const SESSION_KEY: &str = "advisor_session_id";

fn stored_session() -> Option<String> {
    web_sys::window()?
        .session_storage()
        .ok()??
        .get_item(SESSION_KEY)
        .ok()?
}

fn store_session(id: &str) {
    if let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten()) {
        let _ = storage.set_item(SESSION_KEY, id);
    }
}

fn error_bubble(content: String) -> ChatMessage {
    ChatMessage {
        role: "error".into(),
        content,
    }
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
    let (input, set_input) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let (session_id, set_session_id) = signal(None::<String>);
    let (phase, set_phase) = signal(String::from("collecting_profile"));
    let (tools_used, set_tools_used) = signal(Vec::<String>::new());

    // Resume this tab's conversation, or start a new one
    leptos::task::spawn_local(async move {
        if let Some(id) = stored_session() {
            if let Ok(transcript) = api::fetch_transcript(&id).await {
                set_messages.set(transcript.messages);
                set_phase.set(transcript.phase);
                set_session_id.set(Some(transcript.session_id));
                return;
            }
        }

        match api::create_session().await {
            Ok(info) => {
                store_session(&info.session_id);
                set_phase.set(info.phase);
                set_session_id.set(Some(info.session_id));
            }
            Err(e) => set_messages.update(|msgs| msgs.push(error_bubble(e))),
        }
    });

    let send = move || {
        let msg = input.get().trim().to_string();
        let Some(id) = session_id.get() else {
            return;
        };
        if msg.is_empty() || loading.get() {
            return;
        }

        set_messages.update(|msgs| {
            msgs.push(ChatMessage {
                role: "user".into(),
                content: msg.clone(),
            });
        });

        set_input.set(String::new());
        set_loading.set(true);

        leptos::task::spawn_local(async move {
            match api::send_message(&id, &msg).await {
                Ok(reply) => {
                    set_messages.update(|msgs| {
                        msgs.push(ChatMessage {
                            role: "assistant".into(),
                            content: reply.reply,
                        });
                    });
                    set_phase.set(reply.phase);
                    set_tools_used.set(reply.tools_used);
                }
                Err(e) => set_messages.update(|msgs| msgs.push(error_bubble(e))),
            }
            set_loading.set(false);
        });
    };

    let reset = move |_| {
        let Some(id) = session_id.get() else {
            return;
        };
        leptos::task::spawn_local(async move {
            match api::reset_session(&id).await {
                Ok(info) => {
                    set_messages.set(Vec::new());
                    set_tools_used.set(Vec::new());
                    set_phase.set(info.phase);
                }
                Err(e) => set_messages.update(|msgs| msgs.push(error_bubble(e))),
            }
        });
    };

    view! {
        <div class="chat">
            <aside class="sidebar">
                <h2>"Menu"</h2>
                <p>"Powered by Google Gemini and Exa Search."</p>
                <p>"Just start chatting to get your personal investment analysis."</p>
                <PhaseBadge phase=phase />
                <button
                    class="btn"
                    title="Start a new conversation from scratch"
                    on:click=reset
                    disabled=move || loading.get()
                >
                    "Reset conversation"
                </button>
            </aside>

            <main class="chat-main">
                <h1>"🤖 Personal Investment Assistant"</h1>
                <div class="messages">
                    <For
                        each=move || messages.get().into_iter().enumerate()
                        key=|(i, _)| *i
                        children=move |(_, msg)| view! { <MessageBubble message=msg /> }
                    />
                    <Show when=move || loading.get()>
                        <div class="message loading">"Thinking..."</div>
                    </Show>
                    <Show when=move || !tools_used.get().is_empty()>
                        <p class="tools">
                            {move || format!("Looked up: {}", tools_used.get().join(", "))}
                        </p>
                    </Show>
                </div>

                <div class="input-area">
                    <textarea
                        placeholder="Say hello to your investment assistant..."
                        prop:value=move || input.get()
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                    />
                    <button
                        on:click=move |_| send()
                        disabled=move || loading.get() || session_id.get().is_none()
                    >
                        {move || if loading.get() { "..." } else { "Send" }}
                    </button>
                </div>
            </main>
        </div>
    }
}
