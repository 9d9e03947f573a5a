//! XML representation of catalog entities
use std::fmt;
use std::str::FromStr;

use failure::Error as FailureError;
use treexml::{Document, Element, ElementBuilder, XmlVersion};

use errors::Error;
use models::*;

pub trait ToXMLElement {
    fn to_xml(self) -> Element;
}

pub trait ToXMLDocument {
    fn to_xml_document(self) -> Document;
}

/// Entities rendered inside a named list element
pub trait XMLListItem: ToXMLElement {
    const LIST_NAME: &'static str;
}

pub trait FromXMLElement: Sized {
    fn from_xml(element: &Element) -> Result<Self, FailureError>;
}

trait BuildElement {
    fn with_child(self, child: Self) -> Self;

    fn with_child_text<S>(self, name: &str, value: S) -> Self
    where
        S: ToString + fmt::Display;

    fn with_child_option_text<S>(self, name: &str, value: Option<S>) -> Self
    where
        S: ToString + fmt::Display;
}

impl BuildElement for Element {
    fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn with_child_text<S>(self, name: &str, value: S) -> Self
    where
        S: ToString + fmt::Display,
    {
        self.with_child(ElementBuilder::new(name).text(value).element())
    }

    fn with_child_option_text<S>(self, name: &str, value: Option<S>) -> Self
    where
        S: ToString + fmt::Display,
    {
        if let Some(value) = value {
            return self.with_child_text(name, value);
        }

        self
    }
}

impl<T: ToXMLElement> ToXMLDocument for T {
    fn to_xml_document(self) -> Document {
        Document {
            encoding: "UTF-8".to_string(),
            root: Some(self.to_xml()),
            version: XmlVersion::Version10,
        }
    }
}

impl<T: XMLListItem> ToXMLElement for Vec<T> {
    fn to_xml(self) -> Element {
        let mut list = Element::new(T::LIST_NAME);
        list.children = self.into_iter().map(ToXMLElement::to_xml).collect();
        list
    }
}

impl ToXMLElement for Category {
    fn to_xml(self) -> Element {
        Element::new("category")
            .with_child_text("id", self.id)
            .with_child_text("name", self.name)
            .with_child_text("level", self.level)
            .with_child_option_text("parent_id", self.parent_id)
    }
}

impl XMLListItem for Category {
    const LIST_NAME: &'static str = "categories";
}

impl ToXMLElement for Producer {
    fn to_xml(self) -> Element {
        Element::new("producer")
            .with_child_text("id", self.id)
            .with_child_text("name", self.name)
    }
}

impl XMLListItem for Producer {
    const LIST_NAME: &'static str = "producers";
}

impl ToXMLElement for Goods {
    fn to_xml(self) -> Element {
        Element::new("goods")
            .with_child_text("id", self.id)
            .with_child_text("name", self.name)
            .with_child_text("price", self.price)
            .with_child_option_text("description", self.description)
            .with_child_text("in_stock", self.in_stock)
            .with_child_text("category_id", self.category_id)
            .with_child_text("producer_id", self.producer_id)
    }
}

impl XMLListItem for Goods {
    const LIST_NAME: &'static str = "goods_list";
}

fn child_text<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .children
        .iter()
        .find(|child| child.name == name)
        .map(|child| child.text.as_ref().map(|text| text.trim()).unwrap_or(""))
}

fn optional_child<T: FromStr>(element: &Element, name: &str) -> Result<Option<T>, FailureError> {
    match child_text(element, name) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(|_| {
            format_err!("Element <{}> of <{}> has invalid value {}", name, element.name, text)
                .context(Error::Parse)
                .into()
        }),
    }
}

fn required_child<T: FromStr>(element: &Element, name: &str) -> Result<T, FailureError> {
    optional_child(element, name)?.ok_or_else(|| {
        format_err!("Element <{}> is missing in <{}>", name, element.name)
            .context(Error::Parse)
            .into()
    })
}

impl FromXMLElement for NewCategory {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        Ok(NewCategory {
            name: optional_child(element, "name")?.unwrap_or_default(),
            level: optional_child(element, "level")?.unwrap_or_default(),
            parent_id: optional_child(element, "parent_id")?,
        })
    }
}

impl FromXMLElement for UpdateCategory {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        NewCategory::from_xml(element).map(|category| UpdateCategory {
            name: category.name,
            level: category.level,
            parent_id: category.parent_id,
        })
    }
}

impl FromXMLElement for NewProducer {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        Ok(NewProducer {
            name: optional_child(element, "name")?.unwrap_or_default(),
        })
    }
}

impl FromXMLElement for UpdateProducer {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        NewProducer::from_xml(element).map(|producer| UpdateProducer { name: producer.name })
    }
}

impl FromXMLElement for NewGoods {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        Ok(NewGoods {
            name: optional_child(element, "name")?.unwrap_or_default(),
            price: required_child(element, "price")?,
            description: optional_child(element, "description")?,
            in_stock: optional_child(element, "in_stock")?.unwrap_or_default(),
            category_id: required_child(element, "category_id")?,
            producer_id: required_child(element, "producer_id")?,
        })
    }
}

impl FromXMLElement for UpdateGoods {
    fn from_xml(element: &Element) -> Result<Self, FailureError> {
        NewGoods::from_xml(element).map(|goods| UpdateGoods {
            name: goods.name,
            price: goods.price,
            description: goods.description,
            in_stock: goods.in_stock,
            category_id: goods.category_id,
            producer_id: goods.producer_id,
        })
    }
}
