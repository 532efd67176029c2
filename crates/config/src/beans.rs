//! Creating typed objects from configuration subtrees
//!
//! A bean is declared under a key prefix:
//!
//! ```text
//! server.config-class = ServerSettings
//! server.host = localhost
//! server.port = 8080
//! server.pool.size = 4
//! ```
//!
//! Direct children become properties, deeper keys become nested
//! declarations, and the bean is built through serde.

use crate::configuration::Configuration;
use converter::{BooleanConverter, TypeConverter};
use serde::de::{
    value::{Error as DeError, MapDeserializer, SeqDeserializer, StrDeserializer},
    DeserializeOwned, Deserializer, Error as _, IntoDeserializer, Unexpected, Visitor,
};
use std::collections::{BTreeMap, BTreeSet};
use types::{ConfigurationError, Result, Value};

/// Reserved key naming the expected bean type
pub const BEAN_CLASS_KEY: &str = "config-class";

/// Reserved key naming the factory that creates the bean
pub const BEAN_FACTORY_KEY: &str = "config-factory";

const RESERVED_PREFIX: &str = "config-";

/// Everything needed to create one bean
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeanDeclaration {
    pub bean_class_name: Option<String>,
    pub bean_factory_name: Option<String>,
    pub properties: BTreeMap<String, Value>,
    pub nested: BTreeMap<String, BeanDeclaration>,
}

impl BeanDeclaration {
    /// Collect the declaration stored below `prefix`; values are interpolated
    pub fn from_configuration<C>(config: &C, prefix: &str) -> Result<Self>
    where
        C: Configuration + ?Sized,
    {
        let mut declaration = BeanDeclaration::default();
        let mut children = BTreeSet::new();
        let mut found = false;

        for key in config.keys() {
            let Some(rest) = strip_key_prefix(&key, prefix) else {
                continue;
            };
            found = true;

            if let Some((child, _)) = rest.split_once('.') {
                children.insert(child.to_string());
            } else if rest == BEAN_CLASS_KEY {
                declaration.bean_class_name = config.get_string(&key)?;
            } else if rest == BEAN_FACTORY_KEY {
                declaration.bean_factory_name = config.get_string(&key)?;
            } else if !rest.starts_with(RESERVED_PREFIX) {
                if let Some(value) = config.get_property(&key) {
                    declaration
                        .properties
                        .insert(rest.to_string(), interpolate_all(config, value)?);
                }
            }
        }

        if !found {
            return Err(ConfigurationError::MissingKey {
                key: prefix.to_string(),
            });
        }

        for child in children {
            let child_prefix = join_key(prefix, &child);
            declaration
                .nested
                .insert(child, Self::from_configuration(config, &child_prefix)?);
        }

        Ok(declaration)
    }
}

/// Creates beans from declarations
pub trait BeanFactory {
    /// Build a bean of type `T`
    fn create_bean<T: DeserializeOwned>(&self, declaration: &BeanDeclaration) -> Result<T>;

    /// Type created when a declaration names no class
    fn default_bean_class(&self) -> Option<&str> {
        None
    }
}

/// Factory that deserializes the declaration into the requested type.
///
/// String values are converted leniently, so `port = 8080` read from a
/// properties file fills a `u16` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBeanFactory;

impl DefaultBeanFactory {
    /// Name under which the factory can be selected with `config-factory`
    pub const NAME: &'static str = "default";
}

impl BeanFactory for DefaultBeanFactory {
    fn create_bean<T: DeserializeOwned>(&self, declaration: &BeanDeclaration) -> Result<T> {
        let type_name = std::any::type_name::<T>();

        if let Some(class) = declaration.bean_class_name.as_deref() {
            if !matches_type_name(class, type_name) {
                return Err(ConfigurationError::BeanCreation {
                    bean: class.to_string(),
                    message: format!("declared class does not match requested type {}", type_name),
                });
            }
        }

        let bean = T::deserialize(Node::Declaration(declaration)).map_err(|e| {
            ConfigurationError::BeanCreation {
                bean: type_name.to_string(),
                message: e.to_string(),
            }
        })?;

        tracing::debug!(bean = type_name, "Bean created");
        Ok(bean)
    }
}

/// Create the bean declared below `prefix`
pub fn create_bean<T, C>(config: &C, prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
    C: Configuration + ?Sized,
{
    let declaration = BeanDeclaration::from_configuration(config, prefix)?;

    match declaration.bean_factory_name.as_deref() {
        None | Some(DefaultBeanFactory::NAME) => DefaultBeanFactory.create_bean(&declaration),
        Some(other) => Err(ConfigurationError::BeanCreation {
            bean: prefix.to_string(),
            message: format!("unknown bean factory: {}", other),
        }),
    }
}

fn strip_key_prefix<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    if prefix.is_empty() {
        return Some(key);
    }
    key.strip_prefix(prefix)?.strip_prefix('.')
}

fn join_key(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", prefix, child)
    }
}

fn interpolate_all<C: Configuration + ?Sized>(config: &C, value: Value) -> Result<Value> {
    match value {
        Value::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|item| config.interpolate(item))
                .collect::<Result<_>>()?,
        )),
        scalar => config.interpolate(&scalar),
    }
}

fn matches_type_name(class: &str, type_name: &str) -> bool {
    class == type_name || type_name.rsplit("::").next() == Some(class)
}

/// Deserializer over a declaration or one of its values
#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Value(&'a Value),
    Declaration(&'a BeanDeclaration),
}

impl<'a> Node<'a> {
    fn text(self) -> Option<&'a str> {
        match self {
            Node::Value(Value::String(s)) => Some(s.trim()),
            _ => None,
        }
    }
}

impl<'de, 'a> IntoDeserializer<'de, DeError> for Node<'a> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

fn visit_number<'de, V: Visitor<'de>>(text: &str, visitor: V) -> std::result::Result<V::Value, DeError> {
    if let Ok(i) = text.parse::<i64>() {
        visitor.visit_i64(i)
    } else if let Ok(u) = text.parse::<u64>() {
        visitor.visit_u64(u)
    } else if let Ok(f) = text.parse::<f64>() {
        visitor.visit_f64(f)
    } else {
        Err(DeError::invalid_value(Unexpected::Str(text), &"a number"))
    }
}

macro_rules! deserialize_number {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
            match self.text() {
                Some(text) => visit_number(text, visitor),
                None => self.deserialize_any(visitor),
            }
        }
    )*};
}

impl<'de, 'a> Deserializer<'de> for Node<'a> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        match self {
            Node::Value(Value::Boolean(b)) => visitor.visit_bool(*b),
            Node::Value(Value::Integer(i)) => visitor.visit_i64(*i),
            Node::Value(Value::Double(d)) => visitor.visit_f64(*d),
            Node::Value(Value::String(s)) => visitor.visit_str(s),
            Node::Value(Value::List(items)) => {
                let mut seq = SeqDeserializer::<_, DeError>::new(items.iter().map(Node::Value));
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Node::Declaration(declaration) => {
                let entries = declaration
                    .properties
                    .iter()
                    .map(|(key, value)| (key.clone(), Node::Value(value)))
                    .chain(
                        declaration
                            .nested
                            .iter()
                            .map(|(key, nested)| (key.clone(), Node::Declaration(nested))),
                    );
                let mut map = MapDeserializer::<_, DeError>::new(entries);
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        match self {
            Node::Value(value) if matches!(value, Value::String(_)) => match BooleanConverter.convert(value) {
                Ok(b) => visitor.visit_bool(b),
                Err(e) => Err(DeError::custom(e)),
            },
            other => other.deserialize_any(visitor),
        }
    }

    deserialize_number! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        match self {
            Node::Value(Value::String(s)) => visitor.visit_str(s),
            Node::Value(other) => visitor.visit_string(other.to_string()),
            Node::Declaration(_) => self.deserialize_any(visitor),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        visitor.visit_some(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, DeError> {
        match self {
            Node::Value(Value::List(_)) | Node::Declaration(_) => self.deserialize_any(visitor),
            scalar => {
                let mut seq = SeqDeserializer::<_, DeError>::new(std::iter::once(scalar));
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, DeError> {
        match self.text() {
            Some(variant) => {
                let access: StrDeserializer<'_, DeError> = variant.into_deserializer();
                visitor.visit_enum(access)
            }
            None => self.deserialize_any(visitor),
        }
    }

    serde::forward_to_deserialize_any! {
        bytes byte_buf unit unit_struct map struct identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapConfiguration;
    use crate::properties::PropertiesConfiguration;
    use serde::Deserialize;
    use std::str::FromStr;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Fast,
        Safe,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct PoolSettings {
        size: u32,
        timeout: f64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ServerSettings {
        host: String,
        port: u16,
        tls: bool,
        #[serde(default)]
        aliases: Vec<String>,
        pool: PoolSettings,
        mode: Mode,
        label: Option<String>,
    }

    const DOCUMENT: &str = r"
defaults.host = example.org
server.config-class = ServerSettings
server.host = ${defaults.host}
server.port = 8080
server.tls = yes
server.aliases = www, api
server.pool.size = 4
server.pool.timeout = 2.5
server.mode = safe
";

    fn config() -> PropertiesConfiguration {
        PropertiesConfiguration::from_str(DOCUMENT).unwrap()
    }

    #[test]
    fn test_declaration_from_configuration() {
        let declaration = BeanDeclaration::from_configuration(&config(), "server").unwrap();

        assert_eq!(declaration.bean_class_name.as_deref(), Some("ServerSettings"));
        assert_eq!(declaration.bean_factory_name, None);
        assert_eq!(
            declaration.properties.get("host"),
            Some(&Value::from("example.org"))
        );
        assert!(!declaration.properties.contains_key(BEAN_CLASS_KEY));
        assert_eq!(
            declaration.nested["pool"].properties.get("size"),
            Some(&Value::from("4"))
        );
    }

    #[test]
    fn test_create_bean() {
        let server: ServerSettings = create_bean(&config(), "server").unwrap();

        assert_eq!(
            server,
            ServerSettings {
                host: "example.org".to_string(),
                port: 8080,
                tls: true,
                aliases: vec!["www".to_string(), "api".to_string()],
                pool: PoolSettings {
                    size: 4,
                    timeout: 2.5,
                },
                mode: Mode::Safe,
                label: None,
            }
        );
    }

    #[test]
    fn test_scalar_fills_sequence() {
        let mut config = config();
        config
            .set_property("server.aliases", Value::from("only"))
            .unwrap();

        let server: ServerSettings = create_bean(&config, "server").unwrap();
        assert_eq!(server.aliases, vec!["only"]);
        assert_ne!(server.mode, Mode::Fast);
    }

    #[test]
    fn test_typed_values() {
        let mut config = MapConfiguration::new();
        config.add_property("pool.size", Value::from(8)).unwrap();
        config.add_property("pool.timeout", Value::from(1)).unwrap();

        let pool: PoolSettings = create_bean(&config, "pool").unwrap();
        assert_eq!(pool, PoolSettings { size: 8, timeout: 1.0 });
    }

    #[test]
    fn test_class_mismatch() {
        let result: Result<PoolSettings> = create_bean(&config(), "server");
        assert!(matches!(
            result,
            Err(ConfigurationError::BeanCreation { bean, .. }) if bean == "ServerSettings"
        ));
    }

    #[test]
    fn test_invalid_value() {
        let mut config = config();
        config
            .set_property("server.port", Value::from("eighty"))
            .unwrap();

        let result: Result<ServerSettings> = create_bean(&config, "server");
        assert!(matches!(result, Err(ConfigurationError::BeanCreation { .. })));
    }

    #[test]
    fn test_missing_declaration() {
        let result: Result<PoolSettings> = create_bean(&config(), "client");
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingKey { key }) if key == "client"
        ));
    }

    #[test]
    fn test_unknown_factory() {
        let mut config = config();
        config
            .add_property("server.config-factory", Value::from("pooled"))
            .unwrap();

        let result: Result<ServerSettings> = create_bean(&config, "server");
        assert!(matches!(result, Err(ConfigurationError::BeanCreation { .. })));
    }

    #[test]
    fn test_default_factory() {
        let factory = DefaultBeanFactory;
        assert_eq!(factory.default_bean_class(), None);

        let declaration = BeanDeclaration::from_configuration(&config(), "server.pool").unwrap();
        let pool: PoolSettings = factory.create_bean(&declaration).unwrap();
        assert_eq!(pool.size, 4);
    }
}
