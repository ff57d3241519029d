//! ABI encoding of quest board calls and decoding of their return data.

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;

use crate::error::{Error, Result};
use crate::quest::QuestRecord;

pub const QUEST_COUNT_SIG: &str = "questCount()";
pub const GET_QUEST_SIG: &str = "getQuest(uint256)";
pub const CREATE_QUEST_SIG: &str = "createQuest(string,uint256)";
pub const SUBMIT_SIG: &str = "submit(uint256,string)";
pub const SELECT_WINNERS_SIG: &str = "selectWinners(uint256,address[])";

/// A call against the quest board contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestCall {
    QuestCount,
    GetQuest { id: u64 },
    CreateQuest { cid: String, deadline: u64 },
    Submit { id: u64, cid: String },
    /// Addresses stay as typed until encoding.
    SelectWinners { id: u64, winners: Vec<String> },
}

impl QuestCall {
    pub fn signature(&self) -> &'static str {
        match self {
            QuestCall::QuestCount => QUEST_COUNT_SIG,
            QuestCall::GetQuest { .. } => GET_QUEST_SIG,
            QuestCall::CreateQuest { .. } => CREATE_QUEST_SIG,
            QuestCall::Submit { .. } => SUBMIT_SIG,
            QuestCall::SelectWinners { .. } => SELECT_WINNERS_SIG,
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        id(self.signature())
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn encode(&self) -> Result<Bytes> {
        let args = match self {
            QuestCall::QuestCount => vec![],
            QuestCall::GetQuest { id } => vec![Token::Uint(U256::from(*id))],
            QuestCall::CreateQuest { cid, deadline } => vec![
                Token::String(cid.clone()),
                Token::Uint(U256::from(*deadline)),
            ],
            QuestCall::Submit { id, cid } => {
                vec![Token::Uint(U256::from(*id)), Token::String(cid.clone())]
            }
            QuestCall::SelectWinners { id, winners } => {
                let addresses = winners
                    .iter()
                    .map(|w| parse_address(w).map(Token::Address))
                    .collect::<Result<Vec<_>>>()?;
                vec![Token::Uint(U256::from(*id)), Token::Array(addresses)]
            }
        };

        let mut data = self.selector().to_vec();
        data.extend(abi::encode(&args));
        Ok(Bytes::from(data))
    }
}

pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::InvalidAddress(input.to_string()))?;
    if hex.len() != 40 {
        return Err(Error::InvalidAddress(input.to_string()));
    }
    hex.parse::<Address>()
        .map_err(|_| Error::InvalidAddress(input.to_string()))
}

/// Output layout of `getQuest`.
fn quest_output_types() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::String,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bool,
        ParamType::Bool,
        ParamType::Uint(256),
        ParamType::Array(Box::new(ParamType::Address)),
    ]
}

pub fn decode_quest_count(data: &[u8]) -> Result<u64> {
    let mut tokens = abi::decode(&[ParamType::Uint(256)], data)
        .map_err(|e| Error::Decode(format!("questCount: {e}")))?;
    let count = tokens
        .pop()
        .and_then(Token::into_uint)
        .ok_or_else(|| Error::Decode("questCount: missing value".into()))?;
    to_u64(count, "questCount")
}

pub fn decode_quest(id: u64, data: &[u8]) -> Result<QuestRecord> {
    let mut tokens = abi::decode(&quest_output_types(), data)
        .map_err(|e| Error::Decode(format!("getQuest: {e}")))?
        .into_iter();

    let creator = take(&mut tokens, "creator")?
        .into_address()
        .ok_or_else(|| field_error("creator"))?;
    let metadata_cid = take_string(&mut tokens, "metadataCid")?;
    let prize = take(&mut tokens, "prize")?
        .into_uint()
        .ok_or_else(|| field_error("prize"))?;
    let deadline = take_u64(&mut tokens, "deadline")?;
    let cancelled = take(&mut tokens, "cancelled")?
        .into_bool()
        .ok_or_else(|| field_error("cancelled"))?;
    let finalized = take(&mut tokens, "finalized")?
        .into_bool()
        .ok_or_else(|| field_error("finalized"))?;
    let participant_count = take_u64(&mut tokens, "participantCount")?;
    let winners = take(&mut tokens, "winners")?
        .into_array()
        .ok_or_else(|| field_error("winners"))?
        .into_iter()
        .map(|t| t.into_address().ok_or_else(|| field_error("winners")))
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestRecord {
        id,
        creator,
        metadata_cid,
        prize,
        deadline,
        cancelled,
        finalized,
        participant_count,
        winners,
    })
}

/// Return data for a `getQuest` call, the inverse of [`decode_quest`].
pub fn encode_quest(record: &QuestRecord) -> Bytes {
    Bytes::from(abi::encode(&[
        Token::Address(record.creator),
        Token::String(record.metadata_cid.clone()),
        Token::Uint(record.prize),
        Token::Uint(U256::from(record.deadline)),
        Token::Bool(record.cancelled),
        Token::Bool(record.finalized),
        Token::Uint(U256::from(record.participant_count)),
        Token::Array(record.winners.iter().copied().map(Token::Address).collect()),
    ]))
}

fn field_error(field: &str) -> Error {
    Error::Decode(format!("getQuest: unexpected type for {field}"))
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(Error::Decode(format!("{field} does not fit in 64 bits")));
    }
    Ok(value.as_u64())
}

/// Decode the arguments of an encoded call back into a [`QuestCall`].
pub fn decode_call(data: &[u8]) -> Result<QuestCall> {
    if data.len() < 4 {
        return Err(Error::Decode("call data shorter than a selector".into()));
    }
    let (head, args) = data.split_at(4);
    let selector = [head[0], head[1], head[2], head[3]];
    let decode = |types: &[ParamType]| {
        abi::decode(types, args)
            .map(Vec::into_iter)
            .map_err(|e| Error::Decode(format!("call arguments: {e}")))
    };

    if selector == id(QUEST_COUNT_SIG) {
        Ok(QuestCall::QuestCount)
    } else if selector == id(GET_QUEST_SIG) {
        let mut args = decode(&[ParamType::Uint(256)])?;
        Ok(QuestCall::GetQuest {
            id: take_u64(&mut args, "id")?,
        })
    } else if selector == id(CREATE_QUEST_SIG) {
        let mut args = decode(&[ParamType::String, ParamType::Uint(256)])?;
        Ok(QuestCall::CreateQuest {
            cid: take_string(&mut args, "cid")?,
            deadline: take_u64(&mut args, "deadline")?,
        })
    } else if selector == id(SUBMIT_SIG) {
        let mut args = decode(&[ParamType::Uint(256), ParamType::String])?;
        Ok(QuestCall::Submit {
            id: take_u64(&mut args, "id")?,
            cid: take_string(&mut args, "cid")?,
        })
    } else if selector == id(SELECT_WINNERS_SIG) {
        let mut args = decode(&[
            ParamType::Uint(256),
            ParamType::Array(Box::new(ParamType::Address)),
        ])?;
        let quest_id = take_u64(&mut args, "id")?;
        let winners = take(&mut args, "winners")?
            .into_array()
            .ok_or_else(|| Error::Decode("winners: expected address[]".into()))?
            .into_iter()
            .filter_map(Token::into_address)
            .map(|a| format!("{a:?}"))
            .collect();
        Ok(QuestCall::SelectWinners {
            id: quest_id,
            winners,
        })
    } else {
        let hex: String = selector.iter().map(|b| format!("{b:02x}")).collect();
        Err(Error::Decode(format!("unknown selector 0x{hex}")))
    }
}

fn take(tokens: &mut std::vec::IntoIter<Token>, what: &str) -> Result<Token> {
    tokens
        .next()
        .ok_or_else(|| Error::Decode(format!("{what}: missing")))
}

fn take_u64(tokens: &mut std::vec::IntoIter<Token>, what: &str) -> Result<u64> {
    let value = take(tokens, what)?
        .into_uint()
        .ok_or_else(|| Error::Decode(format!("{what}: expected uint")))?;
    to_u64(value, what)
}

fn take_string(tokens: &mut std::vec::IntoIter<Token>, what: &str) -> Result<String> {
    take(tokens, what)?
        .into_string()
        .ok_or_else(|| Error::Decode(format!("{what}: expected string")))
}
