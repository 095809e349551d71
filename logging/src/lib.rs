// Copyright (c) 2021-2023 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::IsTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub use log;

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

/// Send log output to the terminal, filtered by the `RUST_LOG` env variable.
///
/// Safe to call more than once; subsequent calls are no-ops, so tests can
/// initialize logging unconditionally.
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(|| {
        let logging_layer = tracing_subscriber::fmt::Layer::new()
            // Write to stderr to mimic the behavior of env_logger.
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal());

        Registry::default()
            .with(logging_layer)
            .with(EnvFilter::from_default_env())
            // This sets the global default subscriber and installs a 'log'
            // compatibility layer so that the 'log' macros keep working.
            .init();
    });
}
