// Copyright (C) Microsoft Corporation. All rights reserved.

mod cert;
mod ecc;

pub(crate) mod testvectors;

use crate::pem::parse_pem;

fn der_of(pem: &str) -> Vec<u8> {
    parse_pem(pem).unwrap().der
}
