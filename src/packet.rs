use indexmap::IndexMap;

use crate::address::Address;
use crate::error::QueryError;
use crate::parse::{get_u16_be, get_u32_be, get_u8, split_pairs, strip_preamble, OOB_HEADER};

/// Largest possible UDP payload; receive buffers are sized to this.
pub const MAX_DATAGRAM: usize = 65_507;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketType {
    /// `getservers` -- ask the directory for every node it knows about.
    GetServers,
    /// `getserversResponse` -- packed 7-byte address records.
    ///
    /// To be parsed by [ServerListPacket::unpack].
    GetServersResponse,
    /// `getinfo` -- ask a node for its key/value attributes.
    GetInfo,
    /// `infoResponse` -- `\`-delimited key/value text.
    ///
    /// To be parsed by [InfoPacket::unpack].
    InfoResponse,
}

impl PacketType {
    /// The ASCII command (or response marker) carried after the header.
    pub fn command(&self) -> &'static str {
        match self {
            PacketType::GetServers => "getservers GTA5 4 full empty",
            PacketType::GetServersResponse => "getserversResponse",
            // the node echoes the challenge back, nobody checks it
            PacketType::GetInfo => "getinfo r4nd0m",
            PacketType::InfoResponse => "infoResponse",
        }
    }

    /// Separator bytes between a response marker and its payload.
    fn separators(&self) -> usize {
        match self {
            PacketType::GetServersResponse => 1,
            PacketType::InfoResponse => 2,
            PacketType::GetServers | PacketType::GetInfo => 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RequestPacket {
    packet_type: PacketType,
}

impl RequestPacket {
    pub fn get_servers() -> Self {
        RequestPacket {
            packet_type: PacketType::GetServers,
        }
    }

    pub fn get_info() -> Self {
        RequestPacket {
            packet_type: PacketType::GetInfo,
        }
    }

    /// Serializes a request packet into an array of bytes.
    pub fn pack(&self) -> Vec<u8> {
        // packet structure: header, command (no terminator)
        let mut payload: Vec<u8> = Vec::<u8>::new();
        payload.extend_from_slice(&OOB_HEADER.to_le_bytes());
        payload.extend_from_slice(self.packet_type.command().as_bytes());

        payload
    }

    pub fn packet_type(&self) -> &PacketType {
        &self.packet_type
    }
}

/// One `getserversResponse` datagram from the directory.
#[derive(Debug, PartialEq, Eq)]
pub struct ServerListPacket {
    servers: Vec<Address>,
    end_of_transmission: bool,
}

impl ServerListPacket {
    const RECORD_LEN: usize = 7;
    /// "EOT\0" read as a big-endian IP.
    pub const EOT_SENTINEL: u32 = 0x454F_5400;

    /// Deserializes a directory datagram into the addresses it carries.
    ///
    /// Records equal to [Self::EOT_SENTINEL] are noted but not returned;
    /// a trailing partial record is ignored.
    pub fn unpack(incoming: &[u8]) -> Result<Self, QueryError> {
        let packet_type = PacketType::GetServersResponse;
        let payload = strip_preamble(
            incoming,
            packet_type.command().as_bytes(),
            packet_type.separators(),
        )?;

        let mut servers: Vec<Address> = Vec::new();
        let mut end_of_transmission = false;
        for record in payload.chunks_exact(Self::RECORD_LEN) {
            let mut offset: usize = 0;
            // leading `\` separator
            get_u8(record, &mut offset)?;
            let ip = get_u32_be(record, &mut offset)?;
            let port = get_u16_be(record, &mut offset)?;

            if ip == Self::EOT_SENTINEL {
                end_of_transmission = true;
                continue;
            }
            servers.push(Address::from_raw(ip, port));
        }

        Ok(ServerListPacket {
            servers,
            end_of_transmission,
        })
    }

    pub fn servers(&self) -> &[Address] {
        &self.servers
    }

    pub fn into_servers(self) -> Vec<Address> {
        self.servers
    }

    pub fn end_of_transmission(&self) -> bool {
        self.end_of_transmission
    }
}

/// One `infoResponse` datagram from a node.
#[derive(Debug, PartialEq, Eq)]
pub struct InfoPacket {
    fields: IndexMap<String, String>,
}

impl InfoPacket {
    /// Deserializes a node reply into its key/value attributes, in wire order.
    pub fn unpack(incoming: &[u8]) -> Result<Self, QueryError> {
        let packet_type = PacketType::InfoResponse;
        let payload = strip_preamble(
            incoming,
            packet_type.command().as_bytes(),
            packet_type.separators(),
        )?;

        let text = String::from_utf8_lossy(payload);
        let text = text.trim_end_matches(['\0', '\n']);

        Ok(InfoPacket {
            fields: split_pairs(text),
        })
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> IndexMap<String, String> {
        self.fields
    }
}
