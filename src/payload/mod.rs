//! Wire format shared with the receiver.
//!
//! One ASCII line, eight comma separated fields, no framing or checksum:
//!
//! `POD_ID,TEMP,CLASS1,CLASS2,SENS1,SENS2,VOLT,MAMP`
//!
//! The receiver decodes by position, the field order must never change.

use core::fmt::Write;
use core::str::FromStr;

use heapless::String;

use crate::averager::AveragedReading;
use crate::classifier::MoistureClass;
use crate::config::PodIdentity;
use crate::error::Error;

pub const FIELD_COUNT: usize = 8;
pub const PAYLOAD_CAPACITY: usize = 64;

pub type PayloadText = String<PAYLOAD_CAPACITY>;

pub fn encode(pod: &PodIdentity, reading: &AveragedReading) -> Result<PayloadText, Error> {
    let mut payload = PayloadText::new();

    write!(
        payload,
        "{},{},{},{},{},{},{:.2},{:.2}",
        pod.pod_id(),
        reading.temperature_avg,
        reading.moisture_1_class,
        reading.moisture_2_class,
        reading.moisture_1_avg,
        reading.moisture_2_avg,
        reading.voltage_avg,
        reading.current_avg,
    )?;

    Ok(payload)
}

/// A payload as the receiver sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub pod_id: String<{ PodIdentity::MAX_ID_LEN }>,
    pub temperature: i32,
    pub moisture_1_class: MoistureClass,
    pub moisture_2_class: MoistureClass,
    pub moisture_1: i32,
    pub moisture_2: i32,
    pub voltage: f32,
    pub current: f32,
}

pub fn decode(bytes: &[u8]) -> Result<DecodedPayload, Error> {
    let text = core::str::from_utf8(bytes).map_err(|_| Error::MalformedPayload)?;
    // senders may terminate the line
    let text = text.trim_end_matches(['\r', '\n']);

    let mut fields = heapless::Vec::<&str, FIELD_COUNT>::new();
    for field in text.split(',') {
        fields.push(field).map_err(|_| Error::MalformedPayload)?;
    }

    if fields.len() != FIELD_COUNT || fields[0].is_empty() {
        return Err(Error::MalformedPayload);
    }

    Ok(DecodedPayload {
        pod_id: String::try_from(fields[0]).map_err(|_| Error::MalformedPayload)?,
        temperature: parse(fields[1])?,
        moisture_1_class: parse(fields[2])?,
        moisture_2_class: parse(fields[3])?,
        moisture_1: parse(fields[4])?,
        moisture_2: parse(fields[5])?,
        voltage: parse(fields[6])?,
        current: parse(fields[7])?,
    })
}

fn parse<F: FromStr>(field: &str) -> Result<F, Error> {
    field.parse().map_err(|_| Error::MalformedPayload)
}
