//! ESP-NOW broadcast radio.
//!
//! Wi-Fi must already be started in station mode before [`EspNow::take`].

use esp_idf_svc::espnow::{EspNow, PeerInfo};
use esp_idf_svc::sys::{
    esp, esp_wifi_set_channel, wifi_interface_t_WIFI_IF_STA,
    wifi_second_chan_t_WIFI_SECOND_CHAN_NONE, ESP_ERR_ESPNOW_EXIST, ESP_ERR_ESPNOW_NOT_FOUND,
    ESP_ERR_ESPNOW_NO_MEM,
};

use crate::hal::{HalError, RadioLink};
use crate::transport::FrameHandler;

/// All-stations MAC address.
pub const BROADCAST_ADDR: [u8; 6] = [0xff; 6];

pub struct EspNowRadio {
    espnow: EspNow<'static>,
    channel: u8,
}

impl EspNowRadio {
    pub fn new(espnow: EspNow<'static>, channel: u8) -> Self {
        Self { espnow, channel }
    }
}

impl RadioLink for EspNowRadio {
    fn begin(&mut self) -> Result<(), HalError> {
        esp!(unsafe {
            esp_wifi_set_channel(self.channel, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE)
        })?;

        let peer = PeerInfo {
            peer_addr: BROADCAST_ADDR,
            channel: self.channel,
            ifidx: wifi_interface_t_WIFI_IF_STA,
            encrypt: false,
            ..Default::default()
        };
        match self.espnow.add_peer(peer) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == ESP_ERR_ESPNOW_EXIST as i32 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn broadcast(&mut self, frame: &[u8]) -> Result<(), HalError> {
        self.espnow.send(BROADCAST_ADDR, frame).map_err(|e| match e.code() {
            c if c == ESP_ERR_ESPNOW_NO_MEM as i32 => HalError::Busy,
            c if c == ESP_ERR_ESPNOW_NOT_FOUND as i32 => HalError::NoPeer,
            c => HalError::Driver(c),
        })
    }

    fn set_frame_handler<H>(&mut self, handler: H) -> Result<(), HalError>
    where
        H: FrameHandler + Send + 'static,
    {
        self.espnow
            .register_recv_cb(move |_info, data| handler.on_frame(data))?;
        Ok(())
    }
}
