// lib.rs
// Copyright 2024 Matti Hänninen
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

pub mod cli;
pub mod commands;
pub mod config;
pub mod destination;
pub mod env;
pub mod error;
pub mod hooks;
pub mod host;
pub mod host_filter;
pub mod hosts_file;
pub mod launcher;
pub mod logging;
pub mod script;
pub mod session;
pub mod ssh_config;
pub mod template;
