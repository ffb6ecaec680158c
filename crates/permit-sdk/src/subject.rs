//! Subject conditions
//!
//! Leaves over the principal requesting access:
//!
//! | Text                      | XML                                                          |
//! |---------------------------|--------------------------------------------------------------|
//! | `user = alice`            | `<condition field="user" operator="=" value="alice"/>`       |
//! | `group != contractors`    | `<condition field="group" operator="!=" value="contractors"/>` |
//! | `ip 10.0.0.0/8`           | `<condition field="ip" operator="in" value="10.0.0.0/8"/>`   |
//! | `date >= 2024-01-01`      | `<condition field="date" operator="&gt;=" value="2024-01-01"/>` |
//!
//! Values containing spaces are written in double quotes. IP ranges take a
//! prefix length or, for IPv4, a dotted netmask (`10.0.0.0/255.0.0.0`).

use chrono::NaiveDate;
use permit_core::{Condition, LeafCondition, XmlElement};
use permit_parser::{LeafFactory, ParseError, Result, XmlLeafFactory};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// Element name of subject conditions in the XML form
pub const CONDITION_ELEMENT: &str = "condition";

const FIELD_ATTRIBUTE: &str = "field";
const OPERATOR_ATTRIBUTE: &str = "operator";
const VALUE_ATTRIBUTE: &str = "value";
const IP_OPERATOR: &str = "in";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The principal a rule is checked against
pub trait AccessSubject {
    fn user_id(&self) -> &str;

    fn in_group(&self, group: &str) -> bool;

    /// Address the request came from, if known
    fn client_ip(&self) -> Option<IpAddr>;

    /// Date used by `date` conditions, today in local time by default
    fn current_date(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    User,
    Group,
    Ip,
    Date,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "user" => Some(Field::User),
            "group" => Some(Field::Group),
            "ip" => Some(Field::Ip),
            "date" => Some(Field::Date),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Field::User => "user",
            Field::Group => "group",
            Field::Ip => "ip",
            Field::Date => "date",
        }
    }
}

/// Operator of `user` and `group` conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    Equal,
    NotEqual,
}

impl Equality {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(Equality::Equal),
            "!=" => Some(Equality::NotEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Equality::Equal => "=",
            Equality::NotEqual => "!=",
        }
    }

    fn apply(self, matched: bool) -> bool {
        match self {
            Equality::Equal => matched,
            Equality::NotEqual => !matched,
        }
    }
}

/// Operator of `date` conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
}

impl Comparison {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(Comparison::Less),
            "<=" => Some(Comparison::LessOrEqual),
            ">" => Some(Comparison::Greater),
            ">=" => Some(Comparison::GreaterOrEqual),
            "=" | "==" => Some(Comparison::Equal),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Equal => "=",
        }
    }

    /// `ordering` is the subject's value compared to the rule's value
    fn apply(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Equal => ordering == Ordering::Equal,
        }
    }
}

/// `user = <id>` / `user != <id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCondition {
    operator: Equality,
    user_id: String,
}

impl UserCondition {
    pub fn new(operator: Equality, user_id: impl Into<String>) -> Self {
        Self {
            operator,
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for UserCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} {}", self.operator.symbol(), TextValue(&self.user_id))
    }
}

impl<T: AccessSubject> LeafCondition<T> for UserCondition {
    fn evaluate(&self, subject: &T) -> bool {
        self.operator.apply(subject.user_id() == self.user_id)
    }

    fn to_xml(&self) -> XmlElement {
        condition_element(Field::User, self.operator.symbol(), &self.user_id)
    }
}

/// `group = <name>` / `group != <name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCondition {
    operator: Equality,
    group: String,
}

impl GroupCondition {
    pub fn new(operator: Equality, group: impl Into<String>) -> Self {
        Self {
            operator,
            group: group.into(),
        }
    }
}

impl fmt::Display for GroupCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {} {}", self.operator.symbol(), TextValue(&self.group))
    }
}

impl<T: AccessSubject> LeafCondition<T> for GroupCondition {
    fn evaluate(&self, subject: &T) -> bool {
        self.operator.apply(subject.in_group(&self.group))
    }

    fn to_xml(&self) -> XmlElement {
        condition_element(Field::Group, self.operator.symbol(), &self.group)
    }
}

/// `ip <addr>[/<prefix>]`: client address inside a network
///
/// IPv4-mapped IPv6 client addresses are matched as IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpCondition {
    address: IpAddr,
    prefix: u8,
}

impl IpCondition {
    /// Network of `address` with `prefix` leading bits; `None` if the prefix
    /// is longer than the address
    pub fn new(address: IpAddr, prefix: u8) -> Option<Self> {
        (prefix <= max_prefix(address)).then_some(Self { address, prefix })
    }

    /// Parse `addr`, `addr/prefix` or `ipv4/netmask`
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        let (address, mask) = match value.split_once('/') {
            Some((address, mask)) => (address.trim(), Some(mask.trim())),
            None => (value.trim(), None),
        };

        let address: IpAddr = address
            .parse()
            .map_err(|_| format!("invalid IP address {:?}", address))?;

        let prefix = match mask {
            None => max_prefix(address),
            Some(mask) => parse_mask(address, mask)?,
        };

        Self::new(address, prefix)
            .ok_or_else(|| format!("prefix /{} is too long for {}", prefix, address))
    }

    /// Returns true if `ip` lies inside this network
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.address, unmap(ip)) {
            (IpAddr::V4(network), IpAddr::V4(ip)) => {
                let mask = v4_mask(self.prefix);
                u32::from(network) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(network), IpAddr::V6(ip)) => {
                let mask = v6_mask(self.prefix);
                u128::from(network) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl fmt::Display for IpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix == max_prefix(self.address) {
            write!(f, "ip {}", self.address)
        } else {
            write!(f, "ip {}/{}", self.address, self.prefix)
        }
    }
}

impl<T: AccessSubject> LeafCondition<T> for IpCondition {
    fn evaluate(&self, subject: &T) -> bool {
        subject.client_ip().is_some_and(|ip| self.contains(ip))
    }

    fn to_xml(&self) -> XmlElement {
        let value = format!("{}/{}", self.address, self.prefix);
        condition_element(Field::Ip, IP_OPERATOR, &value)
    }
}

fn max_prefix(address: IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn parse_mask(address: IpAddr, mask: &str) -> std::result::Result<u8, String> {
    if let Ok(prefix) = mask.parse::<u8>() {
        return Ok(prefix);
    }
    match (address, mask.parse::<Ipv4Addr>()) {
        (IpAddr::V4(_), Ok(netmask)) => netmask_prefix(netmask)
            .ok_or_else(|| format!("netmask {} is not contiguous", netmask)),
        _ => Err(format!("invalid network mask {:?}", mask)),
    }
}

/// Prefix length of a dotted netmask such as `255.255.240.0`
fn netmask_prefix(netmask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(netmask);
    let prefix = bits.leading_ones();
    // Anything left after the leading ones means a hole in the mask.
    (bits.checked_shl(prefix).unwrap_or(0) == 0).then_some(prefix as u8)
}

fn v4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn v6_mask(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}

fn unmap(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

/// `date <op> YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCondition {
    operator: Comparison,
    date: NaiveDate,
}

impl DateCondition {
    pub fn new(operator: Comparison, date: NaiveDate) -> Self {
        Self { operator, date }
    }
}

impl fmt::Display for DateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date {} {}",
            self.operator.symbol(),
            self.date.format(DATE_FORMAT)
        )
    }
}

impl<T: AccessSubject> LeafCondition<T> for DateCondition {
    fn evaluate(&self, subject: &T) -> bool {
        self.operator.apply(subject.current_date().cmp(&self.date))
    }

    fn to_xml(&self) -> XmlElement {
        let value = self.date.format(DATE_FORMAT).to_string();
        condition_element(Field::Date, self.operator.symbol(), &value)
    }
}

fn condition_element(field: Field, operator: &str, value: &str) -> XmlElement {
    XmlElement::new(CONDITION_ELEMENT)
        .with_attribute(FIELD_ATTRIBUTE, field.name())
        .with_attribute(OPERATOR_ATTRIBUTE, operator)
        .with_attribute(VALUE_ATTRIBUTE, value)
}

/// Value as written in rule text, quoted when it contains whitespace
struct TextValue<'a>(&'a str);

impl fmt::Display for TextValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() || self.0.contains(char::is_whitespace) {
            write!(f, "\"{}\"", self.0)
        } else {
            f.write_str(self.0)
        }
    }
}

/// Leaf factory for `user`, `group`, `ip` and `date` conditions on both
/// surfaces.
///
/// Tokens and elements naming another field are left to other factories.
/// A known field with a bad operator or value fails the parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectConditions;

impl<T: AccessSubject + 'static> LeafFactory<T> for SubjectConditions {
    fn parse_leaf(&self, token: &str) -> Result<Option<Condition<T>>> {
        let Some((field, rest)) = split_field(token) else {
            return Ok(None);
        };
        let (operator, value) = split_operator(rest);
        let value = unquote(value).map_err(|message| ParseError::syntax(message, token))?;

        build(field, operator, value, token).map(Some)
    }
}

impl<T: AccessSubject + 'static> XmlLeafFactory<T> for SubjectConditions {
    fn parse_xml_leaf(&self, element: &XmlElement) -> Result<Option<Condition<T>>> {
        if element.name() != CONDITION_ELEMENT {
            return Ok(None);
        }

        let fragment = element.to_string();
        let field = element
            .attribute(FIELD_ATTRIBUTE)
            .ok_or_else(|| ParseError::syntax("missing field attribute", fragment.as_str()))?;
        let Some(field) = Field::from_name(field.trim()) else {
            return Ok(None);
        };

        let operator = element.attribute(OPERATOR_ATTRIBUTE).unwrap_or_default();
        let value = element
            .attribute(VALUE_ATTRIBUTE)
            .ok_or_else(|| ParseError::syntax("missing value attribute", fragment.as_str()))?;

        build(field, operator.trim(), value.trim(), &fragment).map(Some)
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>')
}

/// Leading field keyword, ended by whitespace or an operator
fn split_field(token: &str) -> Option<(Field, &str)> {
    let end = token
        .find(|c: char| c.is_whitespace() || is_operator_char(c))
        .unwrap_or(token.len());
    let field = Field::from_name(&token[..end])?;
    Some((field, token[end..].trim_start()))
}

fn split_operator(rest: &str) -> (&str, &str) {
    let end = rest
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(rest.len());
    (&rest[..end], rest[end..].trim())
}

fn unquote(value: &str) -> std::result::Result<&str, &'static str> {
    match value.strip_prefix('"') {
        Some(inner) => inner.strip_suffix('"').ok_or("unterminated quoted value"),
        None if value.contains(char::is_whitespace) => {
            Err("values containing spaces must be quoted")
        }
        None => Ok(value),
    }
}

fn build<T: AccessSubject + 'static>(
    field: Field,
    operator: &str,
    value: &str,
    fragment: &str,
) -> Result<Condition<T>> {
    if value.is_empty() {
        return Err(ParseError::syntax(
            format!("{} value missing", field.name()),
            fragment,
        ));
    }
    let unsupported = || {
        ParseError::syntax(
            format!("unsupported {} operator {:?}", field.name(), operator),
            fragment,
        )
    };

    match field {
        Field::User => {
            let operator = Equality::from_symbol(operator).ok_or_else(unsupported)?;
            Ok(Condition::leaf(UserCondition::new(operator, value)))
        }
        Field::Group => {
            let operator = Equality::from_symbol(operator).ok_or_else(unsupported)?;
            Ok(Condition::leaf(GroupCondition::new(operator, value)))
        }
        Field::Ip => {
            if !operator.is_empty() && !operator.eq_ignore_ascii_case(IP_OPERATOR) {
                return Err(unsupported());
            }
            let condition =
                IpCondition::parse(value).map_err(|message| ParseError::syntax(message, fragment))?;
            Ok(Condition::leaf(condition))
        }
        Field::Date => {
            let operator = Comparison::from_symbol(operator).ok_or_else(unsupported)?;
            let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
                ParseError::syntax(format!("invalid date {:?}: {}", value, e), fragment)
            })?;
            Ok(Condition::leaf(DateCondition::new(operator, date)))
        }
    }
}
