// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! Integration tests for configuration loading and log setup.

use std::io::Write;

use chronoflow::chronoflow_config::ChronoflowConfig;
use chronoflow::chronoflow_logging;

#[test]
fn load_config_from_toml_file() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let config_path = temp_dir.path().join("test_chronoflow.toml");

    let mut file = std::fs::File::create(&config_path).expect("create config");
    writeln!(
        file,
        "log_level = \"debug\"\n\n[runtime]\nmailbox_wait_ms = 5000"
    )
    .expect("write config");

    let cfg = ChronoflowConfig::load_from_file(&config_path).expect("load config");
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.runtime.mailbox_wait_ms, 5000);
}

#[test]
fn missing_config_file_is_an_error() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let missing = temp_dir.path().join("nope.toml");
    assert!(ChronoflowConfig::load_from_file(&missing).is_err());
}

#[test]
fn logging_writes_to_the_configured_file() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let log_path = temp_dir.path().join("chronoflow_test.log");
    std::env::set_var("CHRONOFLOW_LOG_FILE", &log_path);

    chronoflow_logging::init_with_level("debug");
    chronoflow_logging::info!("log setup smoke line");

    let contents = std::fs::read_to_string(&log_path).expect("log file");
    assert!(
        contents.contains("log setup smoke line"),
        "log file did not capture the event: {contents}"
    );
}
