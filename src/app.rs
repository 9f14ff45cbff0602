use leptos::*;
use std::rc::Rc;
use strum::IntoEnumIterator;

use crate::{
    application::{
        coordinator::HybridChart,
        live_price_service::GlooFlashScheduler,
        use_cases::render_chart::{ChartGeometry, ChartRender, format_price, format_volume},
    },
    config::EngineConfig,
    domain::{
        chart::{ChartConfig, Color, Point, Size},
        logging::{LogComponent, get_logger},
        market_data::{FlashColor, LivePriceState, Period, Symbol, repositories::QuoteFeed},
    },
    infrastructure::{QuotePoller, QuoteSocket, TickerApiClient},
};

type BrowserChart = HybridChart<TickerApiClient, GlooFlashScheduler>;

const STYLES: &str = r#"
.hybrid-chart { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; color: #374151; }
.hybrid-chart.fullscreen { position: fixed; inset: 0; z-index: 1000; background: #ffffff; padding: 12px; }
.hc-header { display: flex; align-items: baseline; gap: 16px; margin-bottom: 8px; }
.hc-price { font-size: 28px; font-weight: 700; padding: 2px 6px; border-radius: 4px; transition: background-color 0.3s ease; }
.hc-price.up { background: rgba(22, 163, 74, 0.2); }
.hc-price.down { background: rgba(220, 38, 38, 0.2); }
.hc-change.gain { color: #16a34a; }
.hc-change.loss { color: #dc2626; }
.hc-toolbar { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 8px; }
.hc-btn { border: 1px solid #d1d5db; background: #f9fafb; border-radius: 4px; padding: 2px 8px; cursor: pointer; font-size: 12px; }
.hc-btn.active { background: #1f2937; color: #ffffff; }
.hc-toggle { font-size: 12px; display: inline-flex; align-items: center; gap: 4px; }
.hc-plot { position: relative; }
.hc-empty { display: flex; align-items: center; justify-content: center; color: #6b7280; border: 1px dashed #d1d5db; }
.hc-banner { position: absolute; top: 4px; left: 50%; transform: translateX(-50%); background: #fef2f2; color: #b91c1c; font-size: 12px; padding: 2px 8px; border-radius: 4px; }
.hc-loading { position: absolute; top: 4px; right: 70px; font-size: 12px; color: #6b7280; }
.hc-tooltip { position: absolute; pointer-events: none; background: rgba(17, 24, 39, 0.92); color: #f9fafb; font-size: 12px; padding: 6px 8px; border-radius: 4px; line-height: 1.4; }
.hc-stats { display: flex; gap: 16px; font-size: 12px; color: #6b7280; margin-top: 6px; }
"#;

/// Overlay and panel switches shown as checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
enum Toggle {
    Volume,
    Ma50,
    Ma200,
    Benchmark,
}

impl Toggle {
    fn label(self) -> &'static str {
        match self {
            Toggle::Volume => "Volume",
            Toggle::Ma50 => "MA50",
            Toggle::Ma200 => "MA200",
            Toggle::Benchmark => "vs Benchmark",
        }
    }

    fn slot(self, config: &mut ChartConfig) -> &mut bool {
        match self {
            Toggle::Volume => &mut config.show_volume,
            Toggle::Ma50 => &mut config.show_ma50,
            Toggle::Ma200 => &mut config.show_ma200,
            Toggle::Benchmark => &mut config.show_benchmark,
        }
    }

    fn is_on(self, mut config: ChartConfig) -> bool {
        *self.slot(&mut config)
    }

    fn flipped(self, mut config: ChartConfig) -> ChartConfig {
        let slot = self.slot(&mut config);
        *slot = !*slot;
        config
    }
}

fn viewport_size() -> Option<Size> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Size::new(width - 24.0, height - 120.0))
}

fn quote_feed(config: &EngineConfig, client: &TickerApiClient) -> Box<dyn QuoteFeed> {
    match &config.quote_socket_url {
        Some(url) => Box::new(QuoteSocket::new(url.clone())),
        None => Box::new(QuotePoller::new(client.clone(), config.quote_poll_interval_ms)),
    }
}

/// Consolidated price chart for one ticker: timeframe buttons, overlay
/// switches, live price header and the SVG plot.
#[component]
pub fn HybridChartView(symbol: Symbol, #[prop(optional)] config: Option<EngineConfig>) -> impl IntoView {
    let config = config.unwrap_or_default();
    let client = TickerApiClient::new(config.api_base());
    let chart: Rc<BrowserChart> =
        Rc::new(HybridChart::new(symbol.clone(), &config, client.clone(), GlooFlashScheduler));

    let (revision, set_revision) = create_signal(0u64);
    let (live, set_live) = create_signal(LivePriceState::default());

    chart.set_change_listener(Rc::new(move || set_revision.update(|r| *r += 1)));
    chart.set_price_listener(Rc::new(move |state: &LivePriceState| set_live.set(state.clone())));
    chart.attach_quote_feed(quote_feed(&config, &client).subscribe(&symbol));

    let select = {
        let chart = Rc::clone(&chart);
        move |period: Period| {
            let chart = Rc::clone(&chart);
            spawn_local(async move {
                chart.select_period(period).await;
            });
        }
    };
    select(Period::default());

    on_cleanup({
        let chart = Rc::clone(&chart);
        move || chart.dispose()
    });

    let render = {
        let chart = Rc::clone(&chart);
        create_memo(move |_| {
            revision.track();
            live.track();
            chart.render()
        })
    };

    let selected = {
        let chart = Rc::clone(&chart);
        move || {
            revision.track();
            chart.selected_period()
        }
    };
    let chart_config = {
        let chart = Rc::clone(&chart);
        move || {
            revision.track();
            chart.config()
        }
    };

    let period_buttons = Period::iter()
        .map(|period| {
            let select = select.clone();
            let selected = selected.clone();
            view! {
                <button class="hc-btn" class:active=move || selected() == Some(period) on:click=move |_| select(period)>
                    {period.to_string()}
                </button>
            }
        })
        .collect_view();

    let toggle_inputs = Toggle::iter()
        .map(|toggle| {
            let chart = Rc::clone(&chart);
            let chart_config = chart_config.clone();
            let on_change = move |_: web_sys::Event| {
                let chart = Rc::clone(&chart);
                spawn_local(async move {
                    let next = toggle.flipped(chart.config());
                    chart.set_config(next).await;
                });
            };
            view! {
                <label class="hc-toggle">
                    <input type="checkbox" prop:checked=move || toggle.is_on(chart_config()) on:change=on_change />
                    {toggle.label()}
                </label>
            }
        })
        .collect_view();

    let toggle_fullscreen = {
        let chart = Rc::clone(&chart);
        move |_: web_sys::MouseEvent| {
            let fullscreen = chart.toggle_fullscreen();
            chart.set_viewport(if fullscreen { viewport_size() } else { None });
            get_logger().debug(LogComponent::Presentation("HybridChart"), &format!("fullscreen={fullscreen}"));
        }
    };

    let on_move = {
        let chart = Rc::clone(&chart);
        move |event: web_sys::MouseEvent| {
            chart.set_pointer(Some(Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()))));
        }
    };
    let on_leave = {
        let chart = Rc::clone(&chart);
        move |_: web_sys::MouseEvent| chart.set_pointer(None)
    };

    let fullscreen_class = {
        let chart_config = chart_config.clone();
        move || chart_config().fullscreen
    };

    let plot = {
        let chart = Rc::clone(&chart);
        move || match render.get() {
            ChartRender::NoData { message, loading, error_banner } => {
                let size = chart.dimensions().size();
                let text = if loading { "Loading chart data...".to_string() } else { message };
                view! {
                    <div
                        class="hc-empty"
                        style:width={format!("{}px", size.width)}
                        style:height={format!("{}px", size.height)}
                    >
                        {text}
                        {error_banner.map(|b| view! { <div class="hc-banner">{b}</div> })}
                    </div>
                }
                .into_view()
            }
            ChartRender::Chart(geometry) => chart_svg(*geometry).into_view(),
        }
    };

    view! {
        <style>{STYLES}</style>
        <div class="hybrid-chart" class:fullscreen=fullscreen_class>
            <PriceHeader symbol=symbol live=live />
            <div class="hc-toolbar">
                {period_buttons}
                {toggle_inputs}
                <button class="hc-btn" on:click=toggle_fullscreen>"Fullscreen"</button>
            </div>
            <div class="hc-plot" on:mousemove=on_move on:mouseleave=on_leave>
                {plot}
            </div>
            <StatsRow render=render />
        </div>
    }
}

#[component]
fn PriceHeader(symbol: Symbol, live: ReadSignal<LivePriceState>) -> impl IntoView {
    let price_text = move || live.with(|s| s.price.map(format_price).unwrap_or_else(|| "--".to_string()));
    let change_text = move || live.with(|s| format!("{:+.2} ({:+.2}%)", s.change, s.change_percent));
    let price_class = move || live.with(|s| format!("hc-price {}", s.flash_color.as_ref()));
    let change_class = move || live.with(|s| if s.change >= 0.0 { "hc-change gain" } else { "hc-change loss" });

    view! {
        <div class="hc-header">
            <span class="hc-symbol">{symbol.to_string()}</span>
            <span class=price_class>{price_text}</span>
            <span class=change_class>{change_text}</span>
        </div>
    }
}

#[component]
fn StatsRow(render: Memo<ChartRender>) -> impl IntoView {
    move || {
        render.with(|r| r.geometry().and_then(|g| g.statistics)).map(|stats| {
            view! {
                <div class="hc-stats">
                    <span>"High " {format_price(stats.high)}</span>
                    <span>"Low " {format_price(stats.low)}</span>
                    <span>"Change " {format!("{:+.2}%", stats.change_percent)}</span>
                    <span>"Avg Vol " {format_volume(stats.average_volume.round() as u64)}</span>
                </div>
            }
        })
    }
}

fn flash_fill(flash: FlashColor) -> String {
    match flash {
        FlashColor::Up => Color::PRICE_UP.to_css(),
        FlashColor::Down => Color::PRICE_DOWN.to_css(),
        FlashColor::None => Color::NEUTRAL.to_css(),
    }
}

fn chart_svg(g: ChartGeometry) -> impl IntoView {
    let dims = g.dimensions;
    let rect = g.price_rect;
    let axis_x = rect.right() + 6.0;
    let label_y = dims.height - 8.0;
    let line_color = if g.trend_up { Color::PRICE_UP } else { Color::PRICE_DOWN }.to_css();
    let up_volume = Color::PRICE_UP.with_alpha(0.4).to_css();
    let down_volume = Color::PRICE_DOWN.with_alpha(0.4).to_css();

    let grid = g
        .y_ticks
        .into_iter()
        .map(|tick| {
            let text_y = tick.position + 4.0;
            view! {
                <line x1={rect.x} x2={rect.right()} y1={tick.position} y2={tick.position} stroke="#e5e7eb" stroke-width="1" />
                <text x={axis_x} y={text_y} font-size="11" fill="#6b7280">{tick.text}</text>
            }
        })
        .collect_view();

    let x_labels = g
        .x_labels
        .into_iter()
        .map(|label| {
            view! {
                <text x={label.position} y={label_y} font-size="11" fill="#6b7280" text-anchor="middle">{label.text}</text>
            }
        })
        .collect_view();

    let volume = g
        .volume_bars
        .iter()
        .map(|bar| {
            let fill = if bar.bullish { up_volume.clone() } else { down_volume.clone() };
            view! { <rect x={bar.x} y={bar.y} width={bar.width} height={bar.height} fill={fill} /> }
        })
        .collect_view();

    let overlay = |path: Option<String>, color: &'static str, dash: &'static str| {
        path.map(|d| view! { <path d={d} fill="none" stroke={color} stroke-width="1.5" stroke-dasharray={dash} /> })
    };

    let marker = g.current_price.map(|m| {
        let fill = flash_fill(m.flash);
        let class = format!("hc-marker {}", m.flash.as_ref());
        let (box_y, text_y) = (m.y - 9.0, m.y + 4.0);
        view! {
            <g class={class}>
                <line x1={rect.x} x2={rect.right()} y1={m.y} y2={m.y} stroke={fill.clone()} stroke-dasharray="2 2" />
                <rect x={rect.right()} y={box_y} width="58" height="18" rx="3" fill={fill} />
                <text x={axis_x} y={text_y} font-size="11" fill="#ffffff">{m.text}</text>
            </g>
        }
    });

    let crosshair = g.tooltip.as_ref().map(|t| {
        let x = t.content.anchor.x;
        view! { <line x1={x} x2={x} y1={rect.y} y2={rect.bottom()} stroke="#9ca3af" stroke-dasharray="3 3" /> }
    });

    let tooltip = g.tooltip.map(|t| {
        let lines = t.lines.into_iter().map(|(name, value)| view! { <div>{name} ": " {value}</div> }).collect_view();
        view! {
            <div class="hc-tooltip" style:left={format!("{}px", t.position.x)} style:top={format!("{}px", t.position.y)}>
                <div>{t.time}</div>
                {lines}
            </div>
        }
    });

    let view_box = format!("0 0 {} {}", dims.width, dims.height);

    view! {
        <svg width={dims.width} height={dims.height} viewBox={view_box} style="cursor: crosshair;">
            {grid}
            {volume}
            <path d={g.price_path} fill="none" stroke={line_color} stroke-width="2" />
            {overlay(g.ma50_path, "#f59e0b", "none")}
            {overlay(g.ma200_path, "#8b5cf6", "none")}
            {overlay(g.benchmark_path, "#6b7280", "4 3")}
            {x_labels}
            {crosshair}
            {marker}
        </svg>
        {tooltip}
        {g.loading.then(|| view! { <div class="hc-loading">"Updating..."</div> })}
        {g.error_banner.map(|b| view! { <div class="hc-banner">{b}</div> })}
    }
}
