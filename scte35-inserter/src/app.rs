// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Application context: one main loop, one inserter.

use gstreamer as gst;
use scte35::PipelineConfig;
use tracing::info;

use crate::Result;
use crate::pipeline::Inserter;

const SIGINT: i32 = 2;
const SIGTERM: i32 = 15;

pub struct App {
    main_loop: glib::MainLoop,
    inserter: Inserter,
}

impl App {
    /// Initializes GStreamer and builds the inserter for `config`.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        gst::init()?;
        let main_loop = glib::MainLoop::new(None, false);
        let inserter = Inserter::new(config, &main_loop)?;
        Ok(App {
            main_loop,
            inserter,
        })
    }

    /// Plays the pipeline and runs the main loop until SIGINT, SIGTERM or
    /// end of stream. The inserter is torn down on return.
    pub fn run(self) -> Result<()> {
        let signals = [SIGINT, SIGTERM].map(|signum| {
            let main_loop = self.main_loop.clone();
            glib::unix_signal_add_local(signum, move || {
                info!("Received signal {}, stopping", signum);
                main_loop.quit();
                glib::ControlFlow::Continue
            })
        });

        let result = self.inserter.start();
        if result.is_ok() {
            self.main_loop.run();
        }

        for source in signals {
            source.remove();
        }
        result
    }
}
