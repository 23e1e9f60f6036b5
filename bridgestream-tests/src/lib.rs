// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `bridgestream` live under `tests/`.
