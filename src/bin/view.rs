use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use futures::SinkExt;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::info;
use tracing::warn;

use infinite_life::camera::Camera;
use infinite_life::client::RenderClient;
use infinite_life::config::Config;
use infinite_life::config::ViewConfig;
use infinite_life::events::AppEvent;
use infinite_life::events::Event;
use infinite_life::events::ViewEvent;
use infinite_life::io::convert_event;
use infinite_life::logging;
use infinite_life::render::Canvas;

/// Terminal viewer for a life server. Every generation received is drawn, then acknowledged so
/// the server computes the next one.
#[derive(Parser)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server websocket url, overrides `view.server_url`
    #[arg(long)]
    url: Option<String>,
}

enum Outcome {
    Exit,
    Disconnected,
}

/// Everything the pump loop works on
struct Viewer {
    client: RenderClient,
    cam: Camera,
    stdout: io::Stdout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let view = config.view;
    let url = args.url.unwrap_or_else(|| view.server_url.clone());

    logging::init_file(view.log_file.as_deref()).context("Failed to open log file")?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    )?;

    let res = run(&view, &url).await;

    execute!(
        stdout,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    )?;
    terminal::disable_raw_mode()?;

    res
}

async fn run(view: &ViewConfig, url: &str) -> anyhow::Result<()> {
    // The bottom row is the status line
    let (cols, rows) = terminal::size()?;
    let cam = Camera::new(cols, rows.saturating_sub(1));

    let mut viewer = Viewer {
        client: RenderClient::new(view, cam.size()),
        cam,
        stdout: io::stdout(),
    };
    let mut events = EventStream::new();

    loop {
        match viewer.connect(url, &mut events).await? {
            Outcome::Exit => return Ok(()),
            Outcome::Disconnected => viewer.client.on_disconnect(),
        }

        viewer.present()?;

        // Offline: the view stays interactive until a reconnect is asked for
        loop {
            let Some(event) = events.next().await else {
                return Ok(());
            };

            match convert_event(event?) {
                Some(Event::AppEvent(AppEvent::Exit)) => return Ok(()),
                Some(Event::AppEvent(AppEvent::Reconnect)) => break,
                Some(Event::ViewEvent(e)) => viewer.view_event(e)?,
                None => {}
            }
        }
    }
}

impl Viewer {
    /// Run one session against `url` until it ends
    async fn connect(&mut self, url: &str, events: &mut EventStream) -> anyhow::Result<Outcome> {
        let ws = match connect_async(url).await {
            Ok((ws, _)) => ws,
            Err(e) => {
                warn!("Failed to connect to {url}: {e}");
                return Ok(Outcome::Disconnected);
            }
        };

        info!("connected to {url}");
        self.client.on_connect();
        self.present()?;

        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = self
                            .client
                            .on_server_text(text.as_str(), &mut self.cam)
                            .context("Server sent an unusable grid")?;

                        let Some(reply) = reply else { continue };

                        // The frame must be on screen before the server may move on
                        self.present()?;

                        if let Err(e) = sink.send(Message::Text(reply.encode()?.into())).await {
                            warn!("Failed to acknowledge grid: {e}");
                            return Ok(Outcome::Disconnected);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("server closed the connection");
                        return Ok(Outcome::Disconnected);
                    }
                    Some(Err(e)) => {
                        warn!("Connection lost: {e}");
                        return Ok(Outcome::Disconnected);
                    }
                    Some(Ok(_)) => {}
                },
                event = events.next() => {
                    let Some(event) = event else {
                        return Ok(Outcome::Exit);
                    };

                    match convert_event(event?) {
                        Some(Event::AppEvent(AppEvent::Exit)) => return Ok(Outcome::Exit),
                        Some(Event::AppEvent(AppEvent::Reconnect)) | None => {}
                        Some(Event::ViewEvent(e)) => self.view_event(e)?,
                    }
                }
            }
        }
    }

    /// Local input: redraw, never acknowledge
    fn view_event(&mut self, event: ViewEvent) -> io::Result<()> {
        if let ViewEvent::Resize { cols, rows } = event {
            self.cam.resize(cols, rows.saturating_sub(1));
        }

        if let Err(e) = self.client.on_view_event(event, &mut self.cam) {
            warn!("Ignoring view change: {e}");
        }

        self.present()
    }

    fn present(&mut self) -> io::Result<()> {
        let status = self.client.status();
        let frame = self.cam.render();

        queue!(
            self.stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )?;

        for line in frame.lines() {
            queue!(self.stdout, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        queue!(self.stdout, style::Print(status))?;

        self.stdout.flush()
    }
}
