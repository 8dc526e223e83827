//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"🤖 Personal Investment Assistant"</h1>
                <p class="tagline">
                    "Plan your investments around your risk profile and financial goals."
                </p>
                <div class="cta">
                    <a href="/chat" class="btn btn-primary">"Start a conversation"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"🧭 Profile first"</h3>
                    <p>"Age, income, goal and risk tolerance, asked one at a time."</p>
                </div>
                <div class="feature">
                    <h3>"📈 Live data"</h3>
                    <p>"Stock, crypto and gold prices plus current market news."</p>
                </div>
                <div class="feature">
                    <h3>"🧾 Clear plan"</h3>
                    <p>"An allocation in Rupiah with concrete instruments and the reasoning behind it."</p>
                </div>
            </section>
            <p class="powered">"Powered by Google Gemini and Exa Search."</p>
        </div>
    }
}
