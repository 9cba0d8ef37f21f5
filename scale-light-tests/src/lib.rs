// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Tests for `scale-light` live in `tests/`.
