//! Multi-antenna extension of the SISO model.
//!
//! A radio unit has a fixed antenna budget; every attached terminal consumes
//! `ue_antennas` of it.  The serving cell is the candidate whose *scaled*
//! bandwidth — SISO bandwidth times the spatial streams left for a new
//! terminal — is highest, which can favor a farther, lighter cell over a
//! congested nearby one.

use nsg_core::QoS;

use crate::error::WirelessError;
use crate::model::{CellLoad, CellPick, RadioContext, RadioParams, WirelessModel};
use crate::siso::Siso;

/// MIMO radio: SISO link budget plus antenna occupancy.
#[derive(Debug, Clone)]
pub struct Mimo {
    siso: Siso,
    ru_antennas: u32,
    ue_antennas: u32,
}

impl Mimo {
    pub fn new(params: &RadioParams) -> Self {
        // MIMO defaults diverge from SISO: 23 dBm transmit power and a 0 dB
        // noise figure.
        let mut physics = params.clone();
        if physics.transmit_power.is_none() {
            physics.transmit_power = Some(23.0);
        }
        if physics.ue_noise_figure.is_none() {
            physics.ue_noise_figure = Some(0.0);
        }
        Self {
            siso: Siso::new(&physics),
            ru_antennas: params.ru_antennas.unwrap_or(8),
            ue_antennas: params.ue_antennas.unwrap_or(4),
        }
    }

    /// Spatial streams left for one more terminal on a cell already serving
    /// `attached_ues`.  Zero or negative means the cell is saturated.
    fn spatial_streams(&self, attached_ues: u32) -> i64 {
        let available =
            i64::from(self.ru_antennas) - i64::from(attached_ues) * i64::from(self.ue_antennas);
        available.min(i64::from(self.ue_antennas))
    }
}

impl WirelessModel for Mimo {
    fn radius_km(&self) -> f64 {
        self.siso.radius_km()
    }

    fn qos_for(&self, distance_km: f64, ctx: RadioContext<'_>) -> Result<QoS, WirelessError> {
        match ctx {
            RadioContext::Direct => self.siso.qos_at(distance_km),
            RadioContext::Cells(cells) => Ok(self.select_cell(cells)?.qos),
        }
    }

    fn select_cell(&self, cells: &[CellLoad]) -> Result<CellPick, WirelessError> {
        let mut best: Option<(usize, f64)> = None;
        for (index, cell) in cells.iter().enumerate() {
            let qos = self.siso.qos_at(cell.distance_km)?;
            let streams = self.spatial_streams(cell.attached_ues).max(0) as f64;
            let scaled = streams * qos.bandwidth();
            // Strictly-greater keeps the earlier candidate on ties, and the
            // caller sorts candidates by (distance, id).
            if best.is_none_or(|(_, top)| scaled > top) {
                best = Some((index, scaled));
            }
        }
        let (index, _) = best.ok_or(WirelessError::NoCells)?;
        let winner = cells[index];
        if self.spatial_streams(winner.attached_ues) <= 0 {
            // Saturated winner: the terminal is effectively disconnected.
            return Ok(CellPick { index, qos: QoS::minimum() });
        }
        let mut qos = self.siso.qos_at(winner.distance_km)?;
        qos.set_bandwidth(self.spatial_streams(winner.attached_ues) as f64 * qos.bandwidth());
        Ok(CellPick { index, qos })
    }
}
