use crate::tensor::{ElementwiseMath, Tensor};

impl Tensor {
    /// 对张量中的所有元素求和，返回纯数
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 将张量视为一个长向量，计算其L2范数：sqrt(Σx²)
    pub fn l2_norm(&self) -> f32 {
        ElementwiseMath::l2_norm(&self.data)
    }

    /// 逐元素开平方
    pub fn sqrt(&self) -> Tensor {
        Tensor {
            data: ElementwiseMath::sqrt(&self.data),
        }
    }

    /// 逐元素平方
    pub fn square(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| x * x),
        }
    }

    /// 逐元素截断到[min, max]区间
    pub fn clamp(&self, min: f32, max: f32) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| x.clamp(min, max)),
        }
    }
}
